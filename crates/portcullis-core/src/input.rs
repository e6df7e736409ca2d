//! Request canonicalization into the policy-input document.
//!
//! Converts an inbound HTTP request into the immutable [`PolicyInput`]
//! value the decision function evaluates: uppercase method, ordered path
//! segments, lower-cased first-value headers, first-value query parameters,
//! and the parsed JSON body when one is present. Canonicalization is
//! deterministic: the same request bytes always produce the same document.

use std::collections::HashMap;

use http::{HeaderMap, Method, Uri};
use serde::Serialize;
use serde_json::Value;

use crate::error::GateError;

/// Structured input document sent to the decision function.
///
/// Built fresh for every request and immutable once built. Construction
/// reads only borrowed request parts and never mutates the request; the
/// caller is responsible for reinstalling the buffered body bytes so
/// downstream handlers observe an unconsumed stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyInput {
    /// Uppercase HTTP verb, e.g. `GET`.
    pub method: String,
    /// Ordered non-empty path segments; `/orders/42/` yields `["orders", "42"]`.
    pub path: Vec<String>,
    /// Lower-cased header name mapped to its first value.
    pub headers: HashMap<String, String>,
    /// Query parameter name (case preserved) mapped to its first value.
    pub query: HashMap<String, String>,
    /// Parsed JSON body, omitted when the request body was empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl PolicyInput {
    /// Builds the canonical document from request parts and a parsed body.
    pub fn new(method: &Method, uri: &Uri, headers: &HeaderMap, body: Option<Value>) -> Self {
        Self {
            method: method.as_str().to_uppercase(),
            path: split_path_segments(uri.path()),
            headers: collapse_headers(headers),
            query: collapse_query(uri.query().unwrap_or("")),
            body,
        }
    }
}

/// Splits a request path into its non-empty segments.
///
/// Leading and trailing slashes are trimmed before splitting on `/`, and
/// empty segments produced by doubled slashes are dropped, so `//a/b//`,
/// `/a/b/`, and `a/b` all canonicalize to `["a", "b"]`. The root path `/`
/// yields an empty sequence.
pub fn split_path_segments(path: &str) -> Vec<String> {
    path.trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Collapses a header map to lower-cased names and first values.
///
/// When a header occurs multiple times only the first value observed is
/// kept. Values that are not valid UTF-8 are skipped; header names are
/// already lower-cased by the `http` crate.
pub fn collapse_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            map.insert(name.as_str().to_ascii_lowercase(), value.to_owned());
        }
    }
    map
}

/// Collapses a raw query string to first-value parameters.
///
/// Keys keep their original casing; percent-encoding is decoded. When a
/// parameter repeats, the first value wins.
pub fn collapse_query(query: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        map.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    map
}

/// Parses buffered body bytes into the structural body value.
///
/// An empty body is not an error and yields `None`. A non-empty body must
/// be valid JSON; anything else is a [`GateError::BodyParse`].
pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>, GateError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_slice(bytes)?;
    Ok(Some(value))
}
