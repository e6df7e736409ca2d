//! Scripted decision functions.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use portcullis_core::{
    DecisionFunction, DecisionSet, DecisionValue, EvaluationError, PolicyInput,
};

/// Behavior replayed by a [`ScriptedDecision`].
#[derive(Debug, Clone)]
pub enum Script {
    /// First expression is boolean `true`.
    Allow,
    /// First expression is boolean `false`.
    Deny,
    /// First expression is undefined.
    Undefined,
    /// An empty result set, as an undefined query produces.
    Empty,
    /// First expression is a fixed structural value.
    Value(serde_json::Value),
    /// Evaluation fails with the given message.
    Fail(String),
    /// Evaluation never completes; for cancellation tests.
    Hang,
}

/// A decision function that replays a fixed script and counts invocations.
///
/// The invocation count makes "the decision function was never called"
/// assertions possible in gate tests.
#[derive(Debug)]
pub struct ScriptedDecision {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedDecision {
    /// Builds a function replaying `script`.
    pub fn new(script: Script) -> Self {
        Self { script, calls: AtomicUsize::new(0) }
    }

    /// Always allows.
    pub fn allow() -> Self {
        Self::new(Script::Allow)
    }

    /// Always denies with boolean `false`.
    pub fn deny() -> Self {
        Self::new(Script::Deny)
    }

    /// Always yields an undefined first expression.
    pub fn undefined() -> Self {
        Self::new(Script::Undefined)
    }

    /// Always yields an empty result set.
    pub fn empty() -> Self {
        Self::new(Script::Empty)
    }

    /// Always yields the given structural value.
    pub fn value(value: serde_json::Value) -> Self {
        Self::new(Script::Value(value))
    }

    /// Always fails evaluation.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Script::Fail(message.into()))
    }

    /// Never completes an evaluation.
    pub fn hanging() -> Self {
        Self::new(Script::Hang)
    }

    /// Number of evaluations started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionFunction for ScriptedDecision {
    async fn evaluate(&self, _input: &PolicyInput) -> Result<DecisionSet, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Allow => Ok(DecisionSet::single(DecisionValue::Bool(true))),
            Script::Deny => Ok(DecisionSet::single(DecisionValue::Bool(false))),
            Script::Undefined => Ok(DecisionSet::single(DecisionValue::Absent)),
            Script::Empty => Ok(DecisionSet::empty()),
            Script::Value(value) => Ok(DecisionSet::single(DecisionValue::Other(value.clone()))),
            Script::Fail(message) => Err(EvaluationError::new(message.clone())),
            Script::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            },
        }
    }
}
