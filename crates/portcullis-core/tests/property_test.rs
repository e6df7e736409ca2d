//! Property-based tests for canonicalization invariants.
//!
//! Tests the deterministic request-to-document rules that must hold for
//! arbitrary paths and parameter maps, without external dependencies.

use std::collections::HashMap;

use portcullis_core::input::{collapse_query, split_path_segments};
use proptest::{prelude::*, test_runner::Config as ProptestConfig};

/// Deterministic property test configuration for CI stability.
fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 100,
        timeout: 5000,
        fork: false,
        failure_persistence: None,
        source_file: None,
        ..ProptestConfig::default()
    }
}

/// Generates path segments free of separators.
fn segment_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::string::string_regex("[a-zA-Z0-9._~-]{1,12}").unwrap(), 0..6)
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Splitting is insensitive to leading and trailing slash decoration:
    /// `/a/b/`, `a/b`, and `//a/b//` all yield the same segment sequence.
    #[test]
    fn path_splitting_ignores_slash_decoration(
        segments in segment_strategy(),
        leading in 0usize..3,
        trailing in 0usize..3,
    ) {
        let bare = segments.join("/");
        let decorated =
            format!("{}{}{}", "/".repeat(leading), bare, "/".repeat(trailing));

        prop_assert_eq!(split_path_segments(&decorated), segments.clone());
        prop_assert_eq!(split_path_segments(&bare), segments);
    }

    /// Splitting an already-canonical path again changes nothing.
    #[test]
    fn path_splitting_is_idempotent(segments in segment_strategy()) {
        let once = split_path_segments(&segments.join("/"));
        let twice = split_path_segments(&once.join("/"));

        prop_assert_eq!(once, twice);
    }

    /// The first value always wins when a query parameter repeats.
    #[test]
    fn query_collapsing_keeps_first_value(
        key in prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,8}").unwrap(),
        first in prop::string::string_regex("[a-zA-Z0-9]{1,8}").unwrap(),
        rest in prop::collection::vec(
            prop::string::string_regex("[a-zA-Z0-9]{1,8}").unwrap(), 0..4),
    ) {
        let mut pairs = vec![format!("{key}={first}")];
        pairs.extend(rest.iter().map(|v| format!("{key}={v}")));
        let query = pairs.join("&");

        let collapsed = collapse_query(&query);
        let mut expected = HashMap::new();
        expected.insert(key, first);

        prop_assert_eq!(collapsed, expected);
    }
}
