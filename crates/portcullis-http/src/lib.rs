//! Portcullis HTTP layer.
//!
//! Axum middleware implementing the enforcement pipeline (canonicalize,
//! evaluate, gate) and the identity extractor, plus configuration loading,
//! the per-request variable namespace, and router/server assembly. Requests
//! flow through middleware in order:
//! 1. Request ID injection
//! 2. Request/response tracing
//! 3. Timeout enforcement
//! 4. Identity extraction (when configured)
//! 5. Policy enforcement
//! 6. Handler execution

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod server;
pub mod vars;

pub use config::{Config, IdentityConfig, IdentitySource, PolicyConfig};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use server::{create_router, start_server};
pub use vars::{VarMap, IDENTITY_VAR};
