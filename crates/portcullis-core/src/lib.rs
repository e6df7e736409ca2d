//! Core domain types for the Portcullis policy gate.
//!
//! Provides the canonical policy-input document built from an inbound HTTP
//! request, the decision-result model with its fail-closed outcome
//! derivation, the decision-function boundary trait, and the shared error
//! taxonomy. The engine and HTTP crates build on these foundations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod error;
pub mod input;

pub use decision::{DecisionFunction, DecisionResult, DecisionSet, DecisionValue, Outcome};
pub use error::{ConfigError, EvaluationError, GateError};
pub use input::PolicyInput;
