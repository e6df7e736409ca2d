//! Rego-backed decision function.
//!
//! Compiles a policy bundle (a single `.rego` file or a directory of them)
//! once at provisioning time into a [`PreparedQuery`] and implements the
//! [`DecisionFunction`] boundary over it. The prepared state is shared
//! read-only across all request tasks; each evaluation runs on a clone of
//! the engine inside a blocking task so a cancelled request future simply
//! abandons the result instead of stalling the runtime.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use portcullis_core::{
    ConfigError, DecisionFunction, DecisionResult, DecisionSet, DecisionValue, EvaluationError,
    PolicyInput,
};
use tracing::{debug, info};

/// Decision path evaluated when the configuration leaves it unset.
pub const DEFAULT_DECISION_PATH: &str = "authz/allow";

/// A compiled, reusable policy query.
///
/// Created once during provisioning and safe for unsynchronized concurrent
/// use afterwards; evaluation never mutates the prepared state.
#[derive(Clone)]
pub struct PreparedQuery {
    engine: regorus::Engine,
    query: String,
}

impl PreparedQuery {
    /// Compiles the bundle at `bundle_path` and prepares `decision_path`
    /// for evaluation.
    ///
    /// `bundle_path` may name one `.rego` file or a directory, in which
    /// case every `.rego` file in it is loaded (non-recursively, in name
    /// order). A trial evaluation runs before returning so that compile
    /// errors fail provisioning instead of the first request.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BundleRead`] when the path is missing or
    /// unreadable and [`ConfigError::BundleCompile`] when the bundle does
    /// not compile or contains no policy files.
    pub fn prepare(bundle_path: impl AsRef<Path>, decision_path: &str) -> Result<Self, ConfigError> {
        let bundle_path = bundle_path.as_ref();
        let mut engine = regorus::Engine::new();

        for file in bundle_files(bundle_path)? {
            engine
                .add_policy_from_file(&file)
                .map(|_| ())
                .map_err(|e| ConfigError::BundleCompile(e.to_string()))?;
            debug!(file = %file.display(), "loaded policy file");
        }

        let decision_path =
            if decision_path.is_empty() { DEFAULT_DECISION_PATH } else { decision_path };
        let query = decision_query(decision_path);

        // Trial evaluation so an uncompilable bundle is caught before the
        // pipeline starts serving traffic.
        engine
            .clone()
            .eval_query(query.clone(), false)
            .map_err(|e| ConfigError::BundleCompile(e.to_string()))?;

        info!(bundle = %bundle_path.display(), %query, "policy query prepared");
        Ok(Self { engine, query })
    }

    /// The `data.`-rooted query string this instance evaluates.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Debug for PreparedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery").field("query", &self.query).finish_non_exhaustive()
    }
}

#[async_trait]
impl DecisionFunction for PreparedQuery {
    async fn evaluate(&self, input: &PolicyInput) -> Result<DecisionSet, EvaluationError> {
        let input_json =
            serde_json::to_string(input).map_err(|e| EvaluationError::new(e.to_string()))?;
        let mut engine = self.engine.clone();
        let query = self.query.clone();

        let results = tokio::task::spawn_blocking(move || {
            let value = regorus::Value::from_json_str(&input_json)
                .map_err(|e| EvaluationError::new(e.to_string()))?;
            engine.set_input(value);
            engine.eval_query(query, false).map_err(|e| EvaluationError::new(e.to_string()))
        })
        .await
        .map_err(|e| EvaluationError::new(format!("evaluation task failed: {e}")))??;

        Ok(convert_results(results))
    }
}

/// Resolves the set of policy files a bundle path names.
fn bundle_files(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let read_err = |source| ConfigError::BundleRead { path: path.to_path_buf(), source };

    let metadata = std::fs::metadata(path).map_err(read_err)?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let file = entry.path();
        if file.extension().is_some_and(|ext| ext == "rego") {
            files.push(file);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ConfigError::BundleCompile(format!(
            "no .rego files in bundle directory {}",
            path.display()
        )));
    }
    Ok(files)
}

/// Converts a decision path like `authz/allow` into the query
/// `data.authz.allow`.
fn decision_query(decision_path: &str) -> String {
    format!("data.{}", decision_path.trim_matches('/').replace('/', "."))
}

/// Maps the engine's result shape onto the adapter's decision model.
fn convert_results(results: regorus::QueryResults) -> DecisionSet {
    let results = results
        .result
        .into_iter()
        .map(|result| DecisionResult {
            expressions: result.expressions.iter().map(|e| convert_value(&e.value)).collect(),
        })
        .collect();
    DecisionSet { results }
}

fn convert_value(value: &regorus::Value) -> DecisionValue {
    match value {
        regorus::Value::Undefined => DecisionValue::Absent,
        regorus::Value::Bool(b) => DecisionValue::Bool(*b),
        other => DecisionValue::Other(
            serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_path_maps_to_data_rooted_query() {
        assert_eq!(decision_query("authz/allow"), "data.authz.allow");
        assert_eq!(decision_query("/authz/allow/"), "data.authz.allow");
        assert_eq!(decision_query("gateway/http/decision"), "data.gateway.http.decision");
    }

    #[test]
    fn undefined_and_boolean_values_convert_losslessly() {
        assert_eq!(convert_value(&regorus::Value::Undefined), DecisionValue::Absent);
        assert_eq!(convert_value(&regorus::Value::Bool(true)), DecisionValue::Bool(true));
        assert_eq!(convert_value(&regorus::Value::Bool(false)), DecisionValue::Bool(false));
    }

    #[test]
    fn structural_values_convert_to_json() {
        let value = regorus::Value::from_json_str(r#"{"role": "admin"}"#).unwrap();
        let converted = convert_value(&value);
        assert_eq!(converted, DecisionValue::Other(serde_json::json!({"role": "admin"})));
    }
}
