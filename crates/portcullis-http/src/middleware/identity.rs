//! Client identity extraction middleware.
//!
//! Reads one configured header (case-insensitively) and publishes its
//! value into the per-request [`VarMap`] under [`IDENTITY_VAR`] for later
//! stages. This stage never rejects a request: an absent header publishes
//! the empty string and the chain always continues.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use portcullis_core::{input::collapse_headers, ConfigError};
use tracing::debug;

use crate::{
    config::{IdentityConfig, IdentitySource},
    vars::{VarMap, IDENTITY_VAR},
};

/// Provisioned identity-extraction stage.
///
/// Holds only the lower-cased header name; provisioned once and shared
/// read-only across requests.
#[derive(Clone, Debug)]
pub struct IdentityExtractor {
    header_name: String,
}

impl IdentityExtractor {
    /// Validates the identity configuration into a ready stage.
    ///
    /// Fails when the source is empty or unknown, or when a header-sourced
    /// configuration names no header.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, ConfigError> {
        let source: IdentitySource = config.source.parse()?;
        match source {
            IdentitySource::Header => {
                if config.header_name.is_empty() {
                    return Err(ConfigError::MissingField("identity.header_name"));
                }
                Ok(Self { header_name: config.header_name.to_ascii_lowercase() })
            },
        }
    }

    /// The lower-cased header this stage reads.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }
}

/// Middleware publishing the caller identity into the request's variable
/// namespace.
///
/// Must run after raw headers are final and before any stage that reads
/// [`IDENTITY_VAR`].
pub async fn extract_identity(
    State(extractor): State<IdentityExtractor>,
    mut request: Request,
    next: Next,
) -> Response {
    // Same lower-cased first-value collapsing as the policy gate, built
    // independently so the stage behaves identically when mounted alone.
    let headers = collapse_headers(request.headers());
    let identity = headers.get(extractor.header_name()).cloned().unwrap_or_default();

    debug!(
        header = %extractor.header_name(),
        present = !identity.is_empty(),
        "extracted client identity"
    );

    ensure_vars(&mut request).set(IDENTITY_VAR, identity);

    next.run(request).await
}

/// Returns the request's variable namespace, installing one if absent.
fn ensure_vars(request: &mut Request) -> VarMap {
    if let Some(vars) = request.extensions().get::<VarMap>() {
        return vars.clone();
    }
    let vars = VarMap::new();
    request.extensions_mut().insert(vars.clone());
    vars
}
