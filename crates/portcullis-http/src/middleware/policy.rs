//! Policy enforcement middleware.
//!
//! The core of the pipeline: buffers and rehydrates the request body,
//! canonicalizes the request into a [`PolicyInput`], invokes the prepared
//! decision function exactly once, and enforces the fail-closed outcome.
//! The next handler runs only on an explicit allow.

use std::{fmt, sync::Arc};

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use portcullis_core::{input, DecisionFunction, GateError, Outcome, PolicyInput};
use tracing::{instrument, warn};

use crate::error::PipelineError;

/// Shared handle to the provisioned decision function.
///
/// Established once at startup and cloned into every request task; holds
/// no other state.
#[derive(Clone)]
pub struct PolicyGate {
    decision: Arc<dyn DecisionFunction>,
}

impl PolicyGate {
    /// Wraps an already-prepared decision function.
    pub fn new(decision: Arc<dyn DecisionFunction>) -> Self {
        Self { decision }
    }
}

impl fmt::Debug for PolicyGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyGate").finish_non_exhaustive()
    }
}

/// Middleware enforcing the policy decision for one request.
///
/// Exactly one evaluation per request, no retries. On allow the next
/// handler runs with the body reinstalled over the original bytes; on
/// deny, on a body failure, or on an evaluation failure the next handler
/// is never invoked. Cancellation mid-evaluation drops this future and
/// with it any chance of the chain continuing.
#[instrument(
    name = "enforce_policy",
    skip_all,
    fields(method = %request.method(), path = %request.uri().path())
)]
pub async fn enforce_policy(
    State(gate): State<PolicyGate>,
    request: Request,
    next: Next,
) -> Result<Response, PipelineError> {
    let (document, request) = canonicalize(request).await?;

    let set = gate.decision.evaluate(&document).await.map_err(|e| {
        warn!(error = %e, "decision function failed");
        GateError::from(e)
    })?;

    match Outcome::derive(&set) {
        Outcome::Allow => Ok(next.run(request).await),
        Outcome::Deny => {
            warn!("policy denied request");
            Err(PipelineError::Forbidden)
        },
    }
}

/// Buffers the body, parses it, and rebuilds the request over the same
/// bytes so downstream handlers observe an unconsumed stream carrying the
/// original bytes regardless of parse outcome.
async fn canonicalize(request: Request) -> Result<(PolicyInput, Request), PipelineError> {
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| {
        warn!(error = %e, "failed to buffer request body");
        GateError::BodyRead(e.to_string())
    })?;

    let body_value = input::parse_body(&bytes).map_err(|e| {
        warn!(error = %e, "request body is not valid JSON");
        e
    })?;

    let document = PolicyInput::new(&parts.method, &parts.uri, &parts.headers, body_value);
    let request = Request::from_parts(parts, Body::from(bytes));
    Ok((document, request))
}
