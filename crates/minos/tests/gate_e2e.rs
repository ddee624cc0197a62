//! End-to-end tests for the policy gate.
//!
//! Drives real requests through the gate as a pipeline stage, in both local
//! (embedded rego) and remote (stubbed decision endpoint) mode, and pins the
//! exact terminal responses: continue, deny, internal error.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use minos::{
    input_document, DecisionOutcome, GateError, InputBinder, Next, Middleware, PolicyConfig,
    PolicyMiddleware, Request, RequestBinder, RequestScope, Response,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERS_POLICY: &str = r#"
package policy

default allow = false

allow if {
    input.path == "/api/v1/users"
    input.method == "GET"
}
"#;

fn make_request(method: &str, uri: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn ok_handler() -> Next<'static> {
    Next::handler(|_scope, _req| {
        Box::pin(async {
            http::Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from("handled")))
                .unwrap()
        })
    })
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn local_config() -> PolicyConfig {
    PolicyConfig::new("data.policy.allow")
        .with_policy(USERS_POLICY)
        .with_denied_status(StatusCode::FORBIDDEN)
        .with_denied_message("Forbidden")
}

#[tokio::test]
async fn local_allow_continues_untouched() {
    let gate = PolicyMiddleware::new(local_config(), Some(Arc::new(RequestBinder))).unwrap();
    let mut scope = RequestScope::new();

    let response = gate
        .process(&mut scope, make_request("GET", "/api/v1/users"), ok_handler())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes, Bytes::from("handled"));
}

#[tokio::test]
async fn local_deny_returns_configured_response() {
    let gate = PolicyMiddleware::new(local_config(), Some(Arc::new(RequestBinder))).unwrap();
    let mut scope = RequestScope::new();

    let response = gate
        .process(&mut scope, make_request("POST", "/api/v1/users"), ok_handler())
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, json!({"error": "Forbidden"}));
}

#[tokio::test]
async fn construction_fails_without_policy_or_endpoint() {
    let config = PolicyConfig::new("data.policy.allow");
    let result = PolicyMiddleware::new(config, Some(Arc::new(RequestBinder)));
    assert!(matches!(result, Err(GateError::Config(_))));
}

#[tokio::test]
async fn binder_failure_returns_500_not_denial() {
    let failing: Arc<dyn InputBinder> =
        Arc::new(|_: &Request| -> minos::GateResult<minos::InputDocument> {
            Err(GateError::binding("missing tenant header"))
        });
    let gate = PolicyMiddleware::new(local_config(), Some(failing)).unwrap();
    let mut scope = RequestScope::new();

    // This request would satisfy the policy; the binder failure must still
    // surface as an internal error, never as a 403.
    let response = gate
        .process(&mut scope, make_request("GET", "/api/v1/users"), ok_handler())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("input binding failed"));
}

#[tokio::test]
async fn remote_allow_continues() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/policy/allow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .mount(&server)
        .await;

    let endpoint = reqwest::Url::parse(&format!("{}/v1/data", server.uri())).unwrap();
    let config = PolicyConfig::new("data.policy.allow").with_remote_endpoint(endpoint);
    let gate = PolicyMiddleware::new(config, Some(Arc::new(RequestBinder))).unwrap();
    assert!(gate.is_remote());

    let mut scope = RequestScope::new();
    let response = gate
        .process(&mut scope, make_request("GET", "/api/v1/users"), ok_handler())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn remote_deny_returns_configured_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/policy/allow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": false})))
        .mount(&server)
        .await;

    let endpoint = reqwest::Url::parse(&format!("{}/v1/data", server.uri())).unwrap();
    let config = PolicyConfig::new("data.policy.allow")
        .with_remote_endpoint(endpoint)
        .with_denied_status(StatusCode::UNAUTHORIZED)
        .with_denied_message("no access");
    let gate = PolicyMiddleware::new(config, Some(Arc::new(RequestBinder))).unwrap();

    let mut scope = RequestScope::new();
    let response = gate
        .process(&mut scope, make_request("GET", "/api/v1/users"), ok_handler())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({"error": "no access"}));
}

#[tokio::test]
async fn remote_endpoint_error_returns_500_not_denial() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/policy/allow"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let endpoint = reqwest::Url::parse(&format!("{}/v1/data", server.uri())).unwrap();
    let config = PolicyConfig::new("data.policy.allow").with_remote_endpoint(endpoint);
    let gate = PolicyMiddleware::new(config, Some(Arc::new(RequestBinder))).unwrap();

    let mut scope = RequestScope::new();
    let response = gate
        .process(&mut scope, make_request("GET", "/api/v1/users"), ok_handler())
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn remote_wins_when_both_sources_configured() {
    // Inline policy would deny POST; the remote endpoint says yes and the
    // remote mode must win.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/policy/allow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .mount(&server)
        .await;

    let endpoint = reqwest::Url::parse(&format!("{}/v1/data", server.uri())).unwrap();
    let config = local_config().with_remote_endpoint(endpoint);
    let gate = PolicyMiddleware::new(config, Some(Arc::new(RequestBinder))).unwrap();
    assert!(gate.is_remote());

    let mut scope = RequestScope::new();
    let response = gate
        .process(&mut scope, make_request("POST", "/api/v1/users"), ok_handler())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_runs_inside_a_chain() {
    // A stage after the gate only runs when the gate lets the request pass.
    struct TailStage;

    impl Middleware for TailStage {
        fn name(&self) -> &'static str {
            "tail"
        }

        fn process<'a>(
            &'a self,
            scope: &'a mut RequestScope,
            request: Request,
            next: Next<'a>,
        ) -> minos::BoxFuture<'a, Response> {
            Box::pin(async move {
                scope.set_extension(true);
                next.run(scope, request).await
            })
        }
    }

    let gate = PolicyMiddleware::new(local_config(), Some(Arc::new(RequestBinder))).unwrap();
    let tail = TailStage;

    // Allowed request reaches the tail stage.
    let mut scope = RequestScope::new();
    let chain = Next::chain(&tail, ok_handler());
    let response = gate
        .process(&mut scope, make_request("GET", "/api/v1/users"), chain)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(scope.get_extension::<bool>(), Some(&true));
    assert!(scope.get_extension::<DecisionOutcome>().unwrap().allowed);

    // Denied request never reaches it.
    let mut scope = RequestScope::new();
    let chain = Next::chain(&tail, ok_handler());
    let response = gate
        .process(&mut scope, make_request("POST", "/api/v1/users"), chain)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(scope.get_extension::<bool>(), None);
}

#[tokio::test]
async fn custom_binder_controls_the_input_document() {
    // A binder that only reports the method: path no longer matters.
    let binder: Arc<dyn InputBinder> =
        Arc::new(|request: &Request| -> minos::GateResult<minos::InputDocument> {
            Ok(input_document([
                ("path", json!("/api/v1/users")),
                ("method", request.method().as_str().into()),
            ]))
        });
    let gate = PolicyMiddleware::new(local_config(), Some(binder)).unwrap();

    let mut scope = RequestScope::new();
    let response = gate
        .process(&mut scope, make_request("GET", "/somewhere/else"), ok_handler())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
