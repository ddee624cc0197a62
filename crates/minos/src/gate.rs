//! The policy enforcement middleware.
//!
//! One request moves through four steps: bind the input document, dispatch
//! the decision, compare it to the expected result, then either hand the
//! request to the next stage or terminate it.
//!
//! ```text
//! Request ──▶ bind ──▶ evaluate ──▶ compare ──▶ next stage
//!               │          │            │
//!               ▼          ▼            ▼
//!             500        500      denied_status + {"error": denied_message}
//! ```
//!
//! Binder and evaluator failures are internal errors, never denials: a 500
//! here always means "could not decide", and the configured denial response
//! always means "decided, and the decision did not match".

use std::sync::Arc;

use minos_eval::Evaluator;
use tracing::debug;

use crate::binder::{self, InputBinder};
use crate::config::PolicyConfig;
use crate::context::RequestScope;
use crate::error::{GateError, GateResult};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Middleware that enforces a policy decision per request.
///
/// Construction validates the configuration, resolves the input binder, and
/// fixes the evaluation mode; all three are immutable afterwards, so one
/// gate serves any number of concurrent requests without locking.
pub struct PolicyMiddleware {
    config: PolicyConfig,
    binder: Arc<dyn InputBinder>,
    evaluator: Evaluator,
}

/// The gate's verdict for one request, recorded in the [`RequestScope`]
/// for downstream audit stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// The raw evaluated decision.
    pub decision: bool,
    /// Whether the decision matched the expected result.
    pub allowed: bool,
}

impl PolicyMiddleware {
    /// Build a gate from a configuration and an optional per-gate binder.
    ///
    /// Fails fast on an invalid configuration, a missing binder (no
    /// per-gate binder and no configured default), or an inline policy that
    /// does not compile. A gate that gets past this constructor is ready to
    /// serve traffic; nothing is re-validated per request.
    pub fn new(
        config: PolicyConfig,
        binder: Option<Arc<dyn InputBinder>>,
    ) -> GateResult<Self> {
        config.validate()?;
        let binder = binder::resolve(binder, config.default_binder.clone())?;

        // Remote endpoint wins over inline policy; the mode is fixed here
        // and never re-chosen per request.
        let evaluator = if let Some(endpoint) = &config.remote_endpoint {
            Evaluator::remote(endpoint, &config.query, config.remote_timeout)
                .map_err(|e| GateError::config(e.to_string()))?
        } else {
            let policy = config
                .policy
                .as_deref()
                .ok_or_else(|| GateError::config("inline policy missing"))?;
            Evaluator::local(policy, &config.query)
                .map_err(|e| GateError::config(e.to_string()))?
        };

        Ok(Self {
            config,
            binder,
            evaluator,
        })
    }

    /// The configuration this gate enforces.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Whether decisions are fetched from a remote endpoint.
    pub fn is_remote(&self) -> bool {
        self.evaluator.is_remote()
    }

    fn internal_error(&self, scope: &RequestScope, err: &GateError) -> Response {
        if self.config.debug {
            debug!(request_id = %scope.request_id(), error = %err, "policy gate error");
        }
        Response::internal_error(&err.to_string())
    }
}

impl Middleware for PolicyMiddleware {
    fn name(&self) -> &'static str {
        "policy_gate"
    }

    fn process<'a>(
        &'a self,
        scope: &'a mut RequestScope,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if self.config.debug {
                debug!(
                    request_id = %scope.request_id(),
                    query = %self.config.query,
                    "request received"
                );
            }

            let input = match self.binder.bind(&request) {
                Ok(input) => input,
                Err(err) => return self.internal_error(scope, &err),
            };

            let decision = match self.evaluator.evaluate(&input).await {
                Ok(decision) => decision,
                Err(err) => return self.internal_error(scope, &GateError::from(err)),
            };

            if self.config.debug {
                debug!(request_id = %scope.request_id(), decision, "policy decision");
            }

            let allowed = decision == self.config.expected_result;
            scope.set_extension(DecisionOutcome { decision, allowed });

            if allowed {
                next.run(scope, request).await
            } else {
                Response::policy_error(self.config.denied_status, &self.config.denied_message)
            }
        })
    }
}
