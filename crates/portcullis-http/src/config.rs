//! Configuration management for the Portcullis gateway.
//!
//! Configuration is loaded in priority order: environment variables
//! (`PORTCULLIS_*`, `__` separating nested keys), then `portcullis.toml`,
//! then built-in defaults. The shipped defaults point at the demo bundle
//! so the binary runs out of the box.

use std::{net::SocketAddr, str::FromStr};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use portcullis_core::ConfigError;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "portcullis.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address.
    ///
    /// Environment variable: `PORTCULLIS_HOST`
    #[serde(default = "default_host")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORTCULLIS_PORT`
    #[serde(default = "default_port")]
    pub port: u16,
    /// HTTP request timeout in seconds; bounds the whole pipeline
    /// including policy evaluation.
    ///
    /// Environment variable: `PORTCULLIS_REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Log filter passed to the tracing subscriber.
    ///
    /// Environment variable: `PORTCULLIS_RUST_LOG`
    #[serde(default = "default_log_level")]
    pub rust_log: String,
    /// Policy gate configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Identity extractor configuration; the stage is mounted only when
    /// present.
    #[serde(default = "default_identity")]
    pub identity: Option<IdentityConfig>,
}

/// Policy bundle and decision query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Path to the policy bundle: one `.rego` file or a directory of them.
    ///
    /// Environment variable: `PORTCULLIS_POLICY__BUNDLE_PATH`
    #[serde(default = "default_bundle_path")]
    pub bundle_path: String,
    /// Decision path evaluated per request, e.g. `authz/allow`.
    ///
    /// Environment variable: `PORTCULLIS_POLICY__DECISION_PATH`
    #[serde(default = "default_decision_path")]
    pub decision_path: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { bundle_path: default_bundle_path(), decision_path: default_decision_path() }
    }
}

/// Identity extraction configuration, received as plain strings and
/// validated at provisioning time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity origin discriminator; see [`IdentitySource`].
    ///
    /// Environment variable: `PORTCULLIS_IDENTITY__SOURCE`
    #[serde(default)]
    pub source: String,
    /// Header to read for header-sourced identity.
    ///
    /// Environment variable: `PORTCULLIS_IDENTITY__HEADER_NAME`
    #[serde(default)]
    pub header_name: String,
}

/// Closed identity-source discriminator.
///
/// Adding a future identity source means adding a variant here and a match
/// arm in the extractor, not parsing free text at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Identity is read from a request header.
    Header,
}

impl FromStr for IdentitySource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "" => Err(ConfigError::MissingField("identity.source")),
            "header" => Ok(Self::Header),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}

impl Config {
    /// Loads configuration from defaults, `portcullis.toml`, and
    /// `PORTCULLIS_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("PORTCULLIS_").split("__"));

        let config: Self = figment.extract().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates constraints the type system cannot express.
    ///
    /// Identity fields are validated separately when the extractor stage
    /// is provisioned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be greater than 0".into()));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::Invalid("request_timeout must be greater than 0".into()));
        }
        if self.policy.bundle_path.is_empty() {
            return Err(ConfigError::MissingField("policy.bundle_path"));
        }
        Ok(())
    }

    /// Parses the server socket address from host and port.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr)
            .map_err(|_| ConfigError::Invalid(format!("invalid listen address {addr:?}")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            rust_log: default_log_level(),
            policy: PolicyConfig::default(),
            identity: default_identity(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bundle_path() -> String {
    "demos/authz.rego".to_string()
}

fn default_decision_path() -> String {
    "authz/allow".to_string()
}

fn default_identity() -> Option<IdentityConfig> {
    Some(IdentityConfig { source: "header".to_string(), header_name: "x-client-id".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.policy.decision_path, "authz/allow");
        let identity = config.identity.expect("default identity");
        assert_eq!(identity.source, "header");
        assert_eq!(identity.header_name, "x-client-id");
    }

    #[test]
    fn zero_port_fails_validation() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = Config::default();
        config.request_timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_bundle_path_fails_validation() {
        let mut config = Config::default();
        config.policy.bundle_path = String::new();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("policy.bundle_path")));
    }

    #[test]
    fn identity_source_is_a_closed_discriminator() {
        assert_eq!("header".parse::<IdentitySource>().unwrap(), IdentitySource::Header);
        assert!(matches!(
            "".parse::<IdentitySource>(),
            Err(ConfigError::MissingField("identity.source"))
        ));
        assert!(matches!("jwt".parse::<IdentitySource>(), Err(ConfigError::UnknownSource(_))));
    }

    #[test]
    fn listen_addr_combines_host_and_port() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 9090;

        let addr = config.listen_addr().expect("socket address");
        assert_eq!(addr.to_string(), "0.0.0.0:9090");
    }

    #[test]
    fn garbage_host_is_a_config_error() {
        let mut config = Config::default();
        config.host = "not a host".to_string();
        assert!(config.listen_addr().is_err());
    }
}
