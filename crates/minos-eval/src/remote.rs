//! Remote policy evaluation over HTTP.
//!
//! Sends the input document to an OPA-compatible decision endpoint and
//! decodes the boolean result. The wire contract follows the OPA Data API:
//! request body `{"input": <document>}`, response body `{"result": <bool>}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{EvalError, EvalResult};
use crate::input::InputDocument;

/// Request body sent to the decision endpoint.
#[derive(Debug, Serialize)]
struct DecisionRequest<'a> {
    input: &'a InputDocument,
}

/// Response body expected from the decision endpoint.
#[derive(Debug, Deserialize)]
struct DecisionResponse {
    result: Option<serde_json::Value>,
}

/// Evaluates a fixed query by calling a remote decision endpoint.
///
/// One HTTP call per request, no retries and no decision caching. Transport
/// failures, non-success statuses, and undecodable payloads are all
/// [`EvalError`]s: the remote path never invents a decision.
#[derive(Debug, Clone)]
pub struct RemoteEvaluator {
    client: reqwest::Client,
    /// Fully resolved decision URL (endpoint base + query path).
    decision_url: reqwest::Url,
}

impl RemoteEvaluator {
    /// Create an evaluator for `query` against the given endpoint base.
    ///
    /// `endpoint` should point at the data API root of the policy service
    /// (for OPA, `http://host:8181/v1/data`). The query path is appended as
    /// URL segments: `data.policy.allow` becomes `<endpoint>/policy/allow`.
    ///
    /// `timeout`, when set, bounds the whole call so the gate errors out
    /// instead of outliving the host request's deadline.
    pub fn new(
        endpoint: &reqwest::Url,
        query: &str,
        timeout: Option<Duration>,
    ) -> EvalResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let decision_url = decision_url(endpoint, query)?;

        Ok(Self {
            client,
            decision_url,
        })
    }

    /// The resolved URL decisions are requested from.
    pub fn decision_url(&self) -> &reqwest::Url {
        &self.decision_url
    }

    /// Evaluate the query for the given input document.
    #[instrument(skip(self, input), fields(url = %self.decision_url))]
    pub async fn evaluate(&self, input: &InputDocument) -> EvalResult<bool> {
        let response = self
            .client
            .post(self.decision_url.clone())
            .json(&DecisionRequest { input })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvalError::RemoteStatus(status.as_u16()));
        }

        let body: DecisionResponse = response
            .json()
            .await
            .map_err(|e| EvalError::RemotePayload(e.to_string()))?;

        let decision = match body.result {
            Some(serde_json::Value::Bool(b)) => b,
            Some(other) => {
                return Err(EvalError::RemotePayload(format!(
                    "expected boolean result, got {other}"
                )))
            }
            // OPA answers `{}` when the queried rule is undefined.
            None => return Err(EvalError::Undefined),
        };

        debug!(decision, "remote policy evaluation complete");
        Ok(decision)
    }
}

/// Join the endpoint base with the query identifier as path segments.
fn decision_url(endpoint: &reqwest::Url, query: &str) -> EvalResult<reqwest::Url> {
    let path = query.trim_start_matches("data.").replace('.', "/");
    let base = endpoint.as_str().trim_end_matches('/');
    reqwest::Url::parse(&format!("{base}/{path}"))
        .map_err(|e| EvalError::Endpoint(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_url_appends_query_path() {
        let endpoint = reqwest::Url::parse("http://opa:8181/v1/data").unwrap();
        let url = decision_url(&endpoint, "data.policy.allow").unwrap();
        assert_eq!(url.as_str(), "http://opa:8181/v1/data/policy/allow");
    }

    #[test]
    fn test_decision_url_without_data_prefix() {
        let endpoint = reqwest::Url::parse("http://opa:8181/v1/data/").unwrap();
        let url = decision_url(&endpoint, "policy.allow").unwrap();
        assert_eq!(url.as_str(), "http://opa:8181/v1/data/policy/allow");
    }

    #[test]
    fn test_evaluator_construction() {
        let endpoint = reqwest::Url::parse("http://localhost:8181/v1/data").unwrap();
        let evaluator =
            RemoteEvaluator::new(&endpoint, "data.policy.allow", Some(Duration::from_secs(1)));
        assert!(evaluator.is_ok());
    }
}
