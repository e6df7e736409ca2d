//! Portcullis gateway binary.
//!
//! Loads configuration, provisions the enforcement pipeline, and serves
//! HTTP until shutdown. Startup fails fast: if the policy bundle does not
//! compile or the identity stage is misconfigured, no traffic is served.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use portcullis_http::{start_server, Config, Pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    init_tracing(&config.rust_log);

    info!(
        bundle_path = %config.policy.bundle_path,
        decision_path = %config.policy.decision_path,
        identity = config.identity.is_some(),
        "starting portcullis"
    );

    let addr = config.listen_addr().context("invalid listen address")?;
    let pipeline = Pipeline::init(config).context("failed to provision pipeline")?;

    start_server(pipeline, addr).await.context("server error")?;
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
