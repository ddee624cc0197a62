//! Configuration for the policy gate.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;

use crate::binder::InputBinder;
use crate::error::{GateError, GateResult};

/// Configuration for a [`PolicyMiddleware`](crate::gate::PolicyMiddleware).
///
/// Built once, validated once, then shared read-only across all concurrent
/// requests. Either an inline policy or a remote decision endpoint must be
/// present; when both are set the remote endpoint wins.
#[derive(Clone)]
pub struct PolicyConfig {
    /// Rego query path evaluated per request, e.g. `data.policy.allow`.
    pub query: String,
    /// Inline Rego policy source. Opaque to the gate; compiled by the
    /// embedded engine at construction.
    pub policy: Option<String>,
    /// Remote decision endpoint base URL (OPA data API root). Presence
    /// selects remote mode for the lifetime of the gate.
    pub remote_endpoint: Option<reqwest::Url>,
    /// The decision value that means "continue". A decision equal to this
    /// lets the request through; anything else is a denial.
    pub expected_result: bool,
    /// Status code for denial responses.
    pub denied_status: StatusCode,
    /// Message carried in the denial body as `{"error": <message>}`.
    pub denied_message: String,
    /// Emit per-request trace events (receipt, decision, errors). Purely
    /// diagnostic; never affects the decision.
    pub debug: bool,
    /// Upper bound on the remote decision call. Keeps the gate from
    /// outliving the host request's own deadline.
    pub remote_timeout: Option<Duration>,
    /// Fallback input binder, used when the gate is built without one.
    pub default_binder: Option<Arc<dyn InputBinder>>,
}

impl PolicyConfig {
    /// Create a configuration for the given query with default enforcement
    /// settings: expect `true`, deny with 403.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            policy: None,
            remote_endpoint: None,
            expected_result: true,
            denied_status: StatusCode::FORBIDDEN,
            denied_message: "request denied by policy".to_string(),
            debug: false,
            remote_timeout: None,
            default_binder: None,
        }
    }

    /// Set the inline Rego policy source.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Set the remote decision endpoint (selects remote mode).
    pub fn with_remote_endpoint(mut self, endpoint: reqwest::Url) -> Self {
        self.remote_endpoint = Some(endpoint);
        self
    }

    /// Set the decision value that means "continue".
    pub fn with_expected_result(mut self, expected: bool) -> Self {
        self.expected_result = expected;
        self
    }

    /// Set the denial status code.
    pub fn with_denied_status(mut self, status: StatusCode) -> Self {
        self.denied_status = status;
        self
    }

    /// Set the denial message.
    pub fn with_denied_message(mut self, message: impl Into<String>) -> Self {
        self.denied_message = message.into();
        self
    }

    /// Enable or disable per-request trace events.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Bound the remote decision call.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = Some(timeout);
        self
    }

    /// Set the fallback input binder.
    pub fn with_default_binder(mut self, binder: Arc<dyn InputBinder>) -> Self {
        self.default_binder = Some(binder);
        self
    }

    /// Validate the configuration.
    ///
    /// Runs exactly once, inside gate construction; a gate never re-checks
    /// its configuration per request.
    pub fn validate(&self) -> GateResult<()> {
        if self.query.trim().is_empty() {
            return Err(GateError::config("query must not be empty"));
        }
        if self.policy.is_none() && self.remote_endpoint.is_none() {
            return Err(GateError::config(
                "either an inline policy or a remote endpoint is required",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyConfig")
            .field("query", &self.query)
            .field("policy", &self.policy.as_deref().map(str::len))
            .field("remote_endpoint", &self.remote_endpoint)
            .field("expected_result", &self.expected_result)
            .field("denied_status", &self.denied_status)
            .field("denied_message", &self.denied_message)
            .field("debug", &self.debug)
            .field("remote_timeout", &self.remote_timeout)
            .field("default_binder", &self.default_binder.is_some())
            .finish()
    }
}
