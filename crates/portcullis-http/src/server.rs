//! HTTP server assembly and lifecycle.
//!
//! Builds the axum router around a provisioned [`Pipeline`], with health
//! probes outside the gate and everything else behind identity extraction
//! and policy enforcement, and serves it with request IDs, tracing,
//! timeout enforcement, and graceful shutdown.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{any, get},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    handlers,
    middleware::{enforce_policy, extract_identity},
    pipeline::Pipeline,
};

/// Creates the router for a provisioned pipeline.
///
/// Health probes are mounted outside the gate; every other path is echoed
/// from behind it. The identity layer wraps the policy layer so the
/// variable namespace is populated before enforcement runs.
pub fn create_router(pipeline: &Pipeline) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check));

    let mut protected = Router::new()
        .route("/", any(handlers::echo))
        .route("/{*path}", any(handlers::echo))
        .layer(middleware::from_fn_with_state(pipeline.gate(), enforce_policy));
    if let Some(identity) = pipeline.identity() {
        protected = protected.layer(middleware::from_fn_with_state(identity, extract_identity));
    }

    Router::new()
        .merge(health_routes)
        .merge(protected)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(pipeline.config().request_timeout),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
}

/// Middleware to inject a request ID into all responses.
///
/// Adds an `X-Request-Id` header for tracing requests across services.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the pipeline's configured address and serves requests until a
/// shutdown signal is received.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(pipeline: Pipeline, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(&pipeline);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    pipeline.close();
    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Draining in-flight requests");
}
