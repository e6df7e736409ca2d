//! HTTP request handlers for the Portcullis gateway.
//!
//! `health` exposes liveness/readiness probes outside the enforcement
//! gate; `echo` is the demonstration handler mounted behind it so the
//! binary exercises the full chain.

pub mod echo;
pub mod health;

pub use echo::echo;
pub use health::{health_check, liveness_check, readiness_check};
