//! Minos Eval - Policy Decision Dispatch
//!
//! This crate produces boolean policy decisions for the Minos middleware.
//! A decision is the evaluated truth value of a configured query against a
//! per-request input document; interpreting that value (allow vs. deny) is
//! the middleware's job, never this crate's.
//!
//! # Overview
//!
//! Two evaluation modes, chosen once at configuration time:
//!
//! - **Local**: the inline Rego policy is compiled into an embedded
//!   `regorus` engine and queried in-process.
//! - **Remote**: the input document is POSTed to an OPA-compatible decision
//!   endpoint and the boolean `result` is decoded from the response.
//!
//! ```text
//!                      ┌────────────────────────────┐
//!      InputDocument   │   Evaluator                │
//!          │           │   ┌─────────────────────┐  │
//!          ▼           │   │ Local (regorus)     │  │
//!     ┌────────────┐   │   └─────────────────────┘  │
//!     │   Minos    │──▶│   ┌─────────────────────┐  │──▶ bool | EvalError
//!     │ Middleware │   │   │ Remote (HTTP POST)  │  │
//!     └────────────┘   │   └─────────────────────┘  │
//!                      └────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use minos_eval::{Evaluator, input_document};
//!
//! # fn main() -> Result<(), minos_eval::EvalError> {
//! let evaluator = Evaluator::local(
//!     "package policy\ndefault allow = false\nallow if { input.method == \"GET\" }",
//!     "data.policy.allow",
//! )?;
//!
//! let input = input_document([("method", "GET".into())]);
//! # let _ = input;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod input;
pub mod local;
pub mod remote;

// Re-exports for convenience
pub use error::{EvalError, EvalResult};
pub use input::{input_document, InputDocument};
pub use local::LocalEvaluator;
pub use remote::RemoteEvaluator;

use std::time::Duration;

/// A policy evaluator, fixed to one mode for its whole lifetime.
///
/// The variant is selected when the middleware is configured and never
/// switches per request, so dispatch is side-effect-free and a test can
/// substitute either mode freely.
#[derive(Debug, Clone)]
pub enum Evaluator {
    /// Embedded evaluation against an inline policy.
    Local(LocalEvaluator),
    /// HTTP evaluation against a remote decision endpoint.
    Remote(RemoteEvaluator),
}

impl Evaluator {
    /// Build a local evaluator from inline policy source.
    pub fn local(policy: impl Into<String>, query: impl Into<String>) -> EvalResult<Self> {
        Ok(Self::Local(LocalEvaluator::new(policy, query)?))
    }

    /// Build a remote evaluator against a decision endpoint base URL.
    pub fn remote(
        endpoint: &reqwest::Url,
        query: &str,
        timeout: Option<Duration>,
    ) -> EvalResult<Self> {
        Ok(Self::Remote(RemoteEvaluator::new(endpoint, query, timeout)?))
    }

    /// Whether this evaluator calls out over the network.
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Evaluate the configured query for one input document.
    ///
    /// Exactly one of the two paths runs; errors from either path mean
    /// "could not decide" and must not be read as a denial.
    pub async fn evaluate(&self, input: &InputDocument) -> EvalResult<bool> {
        match self {
            Self::Local(local) => local.evaluate(input),
            Self::Remote(remote) => remote.evaluate(input).await,
        }
    }
}
