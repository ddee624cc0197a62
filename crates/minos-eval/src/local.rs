//! Embedded policy evaluation using OPA/Rego.
//!
//! Uses the `regorus` crate, a pure Rust implementation of OPA, to evaluate
//! the configured query against an inline policy. The policy is compiled
//! once at construction; per-request evaluation never recompiles.

use regorus::Engine;
use tracing::{debug, instrument};

use crate::error::{EvalError, EvalResult};
use crate::input::InputDocument;

/// Evaluates a fixed query against an inline Rego policy.
///
/// The engine holding the compiled policy is immutable after construction.
/// Evaluation clones it per request so a shared evaluator can serve many
/// concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct LocalEvaluator {
    /// Engine with the policy source already loaded.
    engine: Engine,
    /// Rego query path, e.g. `data.policy.allow`.
    query: String,
}

impl LocalEvaluator {
    /// Compile `policy` and prepare to evaluate `query` against it.
    ///
    /// Compile failures surface here, at construction, so a broken policy
    /// can never make it into a serving gate.
    pub fn new(policy: impl Into<String>, query: impl Into<String>) -> EvalResult<Self> {
        let mut engine = Engine::new();
        engine
            .add_policy("policy.rego".to_string(), policy.into())
            .map_err(|e| EvalError::compile(e.to_string()))?;

        Ok(Self {
            engine,
            query: query.into(),
        })
    }

    /// The query this evaluator answers.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Evaluate the query for the given input document.
    ///
    /// A query that completes without yielding a boolean is an error, never
    /// an implicit `false`: "could not decide" and "decided false" must stay
    /// distinguishable at the enforcement boundary.
    #[instrument(skip(self, input), fields(query = %self.query))]
    pub fn evaluate(&self, input: &InputDocument) -> EvalResult<bool> {
        let input_json = serde_json::Value::Object(input.clone());
        let regorus_input: regorus::Value = input_json.into();

        // Clone so evaluation takes &self and stays lock-free under load.
        let mut engine = self.engine.clone();
        engine.set_input(regorus_input);

        let results = engine
            .eval_query(self.query.clone(), false)
            .map_err(|e| EvalError::query(e.to_string()))?;

        let decision = extract_boolean(&results).ok_or(EvalError::Undefined)?;

        debug!(decision, "local policy evaluation complete");
        Ok(decision)
    }
}

/// Extract the first boolean expression from query results.
fn extract_boolean(results: &regorus::QueryResults) -> Option<bool> {
    for result in &results.result {
        for expr in &result.expressions {
            if let regorus::Value::Bool(b) = &expr.value {
                return Some(*b);
            }
        }
    }
    None
}
