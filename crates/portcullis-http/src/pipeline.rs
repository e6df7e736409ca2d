//! Pipeline provisioning and lifecycle.
//!
//! [`Pipeline::init`] is the single entry point an embedding host calls
//! with parsed configuration: it validates every field, compiles the
//! policy bundle into a prepared query, and provisions the identity
//! stage. Any failure refuses to produce a pipeline, so the service never
//! serves traffic without a usable decision function.

use std::sync::Arc;

use portcullis_core::ConfigError;
use portcullis_engine::PreparedQuery;
use tracing::info;

use crate::{
    config::Config,
    middleware::{IdentityExtractor, PolicyGate},
};

/// A fully provisioned enforcement pipeline.
///
/// Everything it holds is established once and shared read-only across
/// all concurrent request tasks.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    gate: PolicyGate,
    identity: Option<IdentityExtractor>,
}

impl Pipeline {
    /// Validates the configuration and provisions every stage.
    pub fn init(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let prepared =
            PreparedQuery::prepare(&config.policy.bundle_path, &config.policy.decision_path)?;
        let gate = PolicyGate::new(Arc::new(prepared));

        let identity = config.identity.as_ref().map(IdentityExtractor::from_config).transpose()?;

        info!(
            bundle = %config.policy.bundle_path,
            decision_path = %config.policy.decision_path,
            identity = identity.is_some(),
            "pipeline provisioned"
        );
        Ok(Self { config, gate, identity })
    }

    /// The provisioned configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle to the provisioned policy gate.
    pub fn gate(&self) -> PolicyGate {
        self.gate.clone()
    }

    /// The identity stage, when one is configured.
    pub fn identity(&self) -> Option<IdentityExtractor> {
        self.identity.clone()
    }

    /// Releases the pipeline.
    ///
    /// The prepared query holds no resources needing teardown; this
    /// exists for hosts with symmetric provision/cleanup lifecycles.
    pub fn close(self) {}
}
