//! # Minos
//!
//! Request-time policy enforcement middleware for HTTP services.
//!
//! Minos sits in a host server's request pipeline. For each request it
//! builds an input document, evaluates a configured OPA/Rego query against
//! it, and either lets the request continue or short-circuits it with a
//! configured denial response.
//!
//! ## Request Flow
//!
//! ```text
//! Request → InputBinder → Evaluator (local rego | remote HTTP) → compare
//!                                                                   │
//!              ┌────────────────────────────────────────────────────┤
//!              ▼                        ▼                           ▼
//!        next stage            denied_status +              500 + {"error": …}
//!        (unchanged)        {"error": denied_message}       (bind/eval failure)
//! ```
//!
//! Three outcomes, kept strictly apart:
//!
//! - **Continue**: the decision matched the expected result.
//! - **Denied**: the decision was made and did not match. Answered with the
//!   configured status and message, never logged as a failure.
//! - **Errored**: no decision could be made (binder failure, engine failure,
//!   unreachable endpoint). Answered with 500; never presented as a denial.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use minos::{PolicyConfig, PolicyMiddleware, RequestBinder};
//!
//! # fn main() -> Result<(), minos::GateError> {
//! let config = PolicyConfig::new("data.policy.allow")
//!     .with_policy(r#"
//!         package policy
//!         default allow = false
//!         allow if {
//!             input.path == "/api/v1/users"
//!             input.method == "GET"
//!         }
//!     "#)
//!     .with_denied_message("Forbidden");
//!
//! let gate = PolicyMiddleware::new(config, Some(Arc::new(RequestBinder)))?;
//! # let _ = gate;
//! # Ok(())
//! # }
//! ```
//!
//! The host embeds the gate through the [`Middleware`] trait and drives it
//! with a [`Next`] continuation; Minos never owns the server loop. Remote
//! mode is selected by configuring an endpoint instead of (or in addition
//! to) an inline policy; the mode is fixed at construction and never
//! depends on request content.

#![doc(html_root_url = "https://docs.rs/minos/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod binder;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod types;

// Re-export main types at crate root
pub use binder::{InputBinder, RequestBinder};
pub use config::PolicyConfig;
pub use context::RequestScope;
pub use error::{GateError, GateResult};
pub use gate::{DecisionOutcome, PolicyMiddleware};
pub use middleware::{BoxFuture, Middleware, Next};
pub use types::{Request, Response, ResponseExt};

// The evaluation layer is part of the public contract (binders produce its
// input type, hosts may inspect its errors).
pub use minos_eval::{input_document, EvalError, InputDocument};
