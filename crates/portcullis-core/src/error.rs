//! Error taxonomy for provisioning-time and per-request failures.
//!
//! Three tiers with distinct blast radii: [`ConfigError`] is fatal to
//! startup and prevents the pipeline from serving traffic, [`GateError`]
//! rejects a single request at the HTTP layer, and [`EvaluationError`]
//! marks a decision-function invocation that could not reach a verdict.
//! A policy deny is not part of this taxonomy; it is a valid outcome.

use std::path::PathBuf;

use thiserror::Error;

/// Provisioning-time configuration failures, fatal to startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration field is missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The identity source discriminator names no known variant.
    #[error("unknown identity source: {0:?}")]
    UnknownSource(String),

    /// The policy bundle path could not be read.
    #[error("failed to read policy bundle {}: {source}", path.display())]
    BundleRead {
        /// Configured bundle location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The policy bundle failed to compile into a usable query.
    #[error("failed to prepare policy query: {0}")]
    BundleCompile(String),

    /// A configuration value is malformed or out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure of a decision-function invocation.
///
/// The engine could not execute the query; this is never a business deny
/// and surfaces to the caller as an internal error, not a forbidden one.
#[derive(Debug, Error)]
#[error("policy evaluation failed: {message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    /// Wraps an engine failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The underlying engine failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Per-request pipeline failures, recoverable at the HTTP layer.
///
/// Each variant rejects exactly one request and never crashes the process.
#[derive(Debug, Error)]
pub enum GateError {
    /// The request body stream could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The request body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    BodyParse(#[from] serde_json::Error),

    /// The decision function failed to execute.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl GateError {
    /// Stable error code for client disambiguation.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BodyRead(_) => "PC-BODY-READ",
            Self::BodyParse(_) => "PC-BODY-PARSE",
            Self::Evaluation(_) => "PC-EVAL",
        }
    }
}
