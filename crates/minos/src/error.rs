//! Error types for the gate.

use minos_eval::EvalError;
use thiserror::Error;

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Errors raised by the policy gate.
///
/// A denial is deliberately absent here. A request whose decision does not
/// match the expected outcome got a perfectly valid decision; it is answered
/// with the configured denial response, never surfaced as an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    /// Invalid or incomplete configuration. Fatal at construction: the
    /// middleware refuses to start and never serves traffic.
    #[error("invalid gate configuration: {0}")]
    Config(String),

    /// Input construction failed for one request.
    #[error("input binding failed: {0}")]
    Binding(String),

    /// The evaluator could not produce a decision for one request.
    #[error("policy evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

impl GateError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a binding error.
    pub fn binding(message: impl Into<String>) -> Self {
        Self::Binding(message.into())
    }

    /// Check if this is a configuration error.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = GateError::config("query must not be empty");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "invalid gate configuration: query must not be empty"
        );
    }

    #[test]
    fn test_binding_error_display() {
        let err = GateError::binding("request body was not valid JSON");
        assert!(!err.is_config());
        assert!(err.to_string().contains("input binding failed"));
    }

    #[test]
    fn test_eval_error_conversion() {
        let err: GateError = EvalError::Undefined.into();
        assert!(matches!(err, GateError::Evaluation(EvalError::Undefined)));
    }
}
