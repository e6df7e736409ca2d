//! Demonstration echo handler mounted behind the enforcement gate.
//!
//! Returns the request body verbatim, which makes body rehydration
//! observable end to end: whatever bytes the gate buffered and inspected
//! come straight back. The extracted identity, when published, is echoed
//! in the `X-Client-Identity` response header.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::vars::{VarMap, IDENTITY_VAR};

/// Echoes the request body and annotates the response with the method,
/// path, and extracted identity.
pub async fn echo(request: Request) -> Response {
    let identity = request.extensions().get::<VarMap>().and_then(|vars| vars.get(IDENTITY_VAR));
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let bytes = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("x-echo-method", method.as_str())
        .header("x-echo-path", path);
    if let Some(value) = identity.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
        builder = builder.header("x-client-identity", value);
    }

    match builder.body(Body::from(bytes)) {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
