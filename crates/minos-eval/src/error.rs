//! Error types for policy decision dispatch.

use thiserror::Error;

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while producing a policy decision.
///
/// An `EvalError` means the evaluator could not decide at all. It is never
/// conflated with a decision that merely came out the "wrong" way: callers
/// must treat these as internal failures, not as denials.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Policy source failed to compile.
    #[error("policy compilation failed: {0}")]
    Compile(String),

    /// The embedded engine failed while evaluating the query.
    #[error("query evaluation failed: {0}")]
    Query(String),

    /// The query completed but produced no boolean result.
    #[error("query produced no boolean result")]
    Undefined,

    /// The remote decision endpoint URL is not usable.
    #[error("invalid decision endpoint: {0}")]
    Endpoint(String),

    /// The remote call failed in transport (connect, timeout, cancellation).
    #[error("remote decision request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote endpoint answered with a non-success status.
    #[error("remote decision endpoint returned status {0}")]
    RemoteStatus(u16),

    /// The remote response body could not be decoded into a decision.
    #[error("remote decision payload invalid: {0}")]
    RemotePayload(String),
}

impl EvalError {
    /// Create a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Check whether this error originated on the remote path.
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::RemoteStatus(_) | Self::RemotePayload(_)
        )
    }
}
