//! Test support for the Portcullis pipeline.
//!
//! Provides scripted decision functions with invocation counting, so gate
//! behavior can be exercised without compiling a policy bundle, and small
//! request builders shared by the workspace's integration tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod requests;

pub use decision::{Script, ScriptedDecision};
pub use requests::{get, post_json, post_raw};
