//! Health check handlers for service monitoring.
//!
//! Provides liveness, readiness, and health endpoints for orchestration
//! systems. These routes are mounted outside the enforcement gate: probes
//! must answer even when the policy denies everything. Readiness is
//! implied by the server being up at all, since the pipeline refuses to
//! start without a usable decision function.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status.
    pub status: &'static str,
    /// Individual component health checks.
    pub checks: HealthChecks,
    /// Service version information.
    pub version: &'static str,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// The provisioned policy query; always ready once serving.
    pub policy: &'static str,
}

/// Reports overall service health.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        checks: HealthChecks { policy: "ready" },
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe; answers as long as the process serves requests.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe; the gate is provisioned before the listener binds.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
