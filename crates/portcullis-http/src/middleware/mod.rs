//! HTTP middleware stages of the enforcement pipeline.
//!
//! `policy` is the core gate: canonicalize, evaluate, allow or deny.
//! `identity` is the independent extractor stage that publishes the caller
//! identity into the per-request variable namespace.

pub mod identity;
pub mod policy;

pub use identity::{extract_identity, IdentityExtractor};
pub use policy::{enforce_policy, PolicyGate};
