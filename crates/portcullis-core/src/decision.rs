//! Decision results, outcome derivation, and the decision-function boundary.
//!
//! The decision function is consumed as an opaque, pre-compiled query: it
//! receives one [`PolicyInput`] document and returns a set of results whose
//! first expression value drives the fail-closed allow/deny derivation.

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::EvaluationError, input::PolicyInput};

/// A single expression value inside a decision result.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionValue {
    /// The expression evaluated to undefined.
    Absent,
    /// The expression evaluated to a boolean.
    Bool(bool),
    /// The expression evaluated to some other structural value.
    Other(Value),
}

/// One result produced by a decision-function invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionResult {
    /// Expression values in evaluation order.
    pub expressions: Vec<DecisionValue>,
}

/// The complete result set of one decision-function invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionSet {
    /// Results in evaluation order; empty when the query was undefined.
    pub results: Vec<DecisionResult>,
}

impl DecisionSet {
    /// A set with no results, as produced by an undefined query.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set carrying exactly one result with one expression value.
    pub fn single(value: DecisionValue) -> Self {
        Self { results: vec![DecisionResult { expressions: vec![value] }] }
    }

    /// The first expression value of the first result, if any.
    fn first_expression(&self) -> Option<&DecisionValue> {
        self.results.first().and_then(|result| result.expressions.first())
    }
}

/// Binary authorization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request proceeds to the next handler.
    Allow,
    /// The request is terminated with a forbidden response.
    Deny,
}

impl Outcome {
    /// Applies the fail-closed derivation rule to a decision set.
    ///
    /// Only a first expression value of boolean `true` allows. An empty
    /// result set, a result with no expressions, an undefined value, any
    /// non-boolean value (including the string `"true"`), and boolean
    /// `false` all deny.
    pub fn derive(set: &DecisionSet) -> Self {
        match set.first_expression() {
            Some(DecisionValue::Bool(true)) => Self::Allow,
            _ => Self::Deny,
        }
    }

    /// Returns true for [`Outcome::Allow`].
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// A prepared, reusable decision function.
///
/// Implementations are provisioned once at startup and shared read-only
/// across all concurrent request tasks, so they must be `Send + Sync` and
/// must not mutate shared state during evaluation. Exactly one invocation
/// is made per request with no retries; a returned error means the engine
/// could not reach a verdict, which is distinct from a negative verdict.
#[async_trait]
pub trait DecisionFunction: Send + Sync {
    /// Evaluates the prepared query against one canonical input document.
    async fn evaluate(&self, input: &PolicyInput) -> Result<DecisionSet, EvaluationError>;
}
