//! HTTP mapping for per-request pipeline failures.
//!
//! Converts the core error taxonomy into structured JSON responses with
//! stable codes: 400 for body failures, 500 for evaluation failures, and
//! 403 for a policy deny. The deny response deliberately carries no
//! internal detail; everything else lands in the logs, not the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portcullis_core::GateError;
use serde::Serialize;

/// Terminal per-request failures of the enforcement pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// Canonicalization or evaluation failed.
    Gate(GateError),
    /// The policy reached a negative verdict. An expected outcome, not a
    /// fault; surfaced as 403 with a generic message.
    Forbidden,
}

impl From<GateError> for PipelineError {
    fn from(err: GateError) -> Self {
        Self::Gate(err)
    }
}

/// JSON error envelope returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message.
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable error code for client disambiguation.
    pub code: String,
    /// Client-safe error description.
    pub message: String,
}

impl PipelineError {
    /// Stable error code for client disambiguation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gate(err) => err.code(),
            Self::Forbidden => "PC-DENIED",
        }
    }

    /// HTTP status the failure maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Gate(GateError::BodyRead(_) | GateError::BodyParse(_)) => {
                StatusCode::BAD_REQUEST
            },
            Self::Gate(GateError::Evaluation(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing message; internal detail stays in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            Self::Gate(GateError::BodyRead(_)) => "failed to read request body",
            Self::Gate(GateError::BodyParse(_)) => "invalid JSON body",
            Self::Gate(GateError::Evaluation(_)) => "policy evaluation failed",
            Self::Forbidden => "request denied",
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.public_message().to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use portcullis_core::EvaluationError;

    use super::*;

    #[test]
    fn status_mapping_matches_the_contract() {
        assert_eq!(
            PipelineError::from(GateError::BodyRead("closed".into())).status(),
            StatusCode::BAD_REQUEST
        );
        let parse = serde_json::from_slice::<serde_json::Value>(b"nope").unwrap_err();
        assert_eq!(PipelineError::from(GateError::from(parse)).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PipelineError::from(GateError::from(EvaluationError::new("boom"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(PipelineError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn deny_response_leaks_no_detail() {
        assert_eq!(PipelineError::Forbidden.code(), "PC-DENIED");
        assert_eq!(PipelineError::Forbidden.public_message(), "request denied");

        let response = PipelineError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
