//! Input binding: turning a request into a policy input document.

use std::sync::Arc;

use minos_eval::InputDocument;
use serde_json::Value;

use crate::error::{GateError, GateResult};
use crate::types::Request;

/// Builds the input document the policy is evaluated against.
///
/// A binder must be a pure function of the request's observable data
/// (method, path, headers, body) and must not touch shared state. A binder
/// failure is an internal error for that request, never an implicit denial:
/// "could not evaluate" and "evaluated to false" stay distinct.
pub trait InputBinder: Send + Sync {
    /// Extract the input document from the request.
    fn bind(&self, request: &Request) -> GateResult<InputDocument>;
}

impl<F> InputBinder for F
where
    F: Fn(&Request) -> GateResult<InputDocument> + Send + Sync,
{
    fn bind(&self, request: &Request) -> GateResult<InputDocument> {
        self(request)
    }
}

/// Resolve the binder the gate will use, once, at construction.
///
/// The per-gate binder wins over the configuration's default binder. With
/// neither present construction fails: a gate that cannot build input must
/// never serve traffic.
pub(crate) fn resolve(
    explicit: Option<Arc<dyn InputBinder>>,
    default: Option<Arc<dyn InputBinder>>,
) -> GateResult<Arc<dyn InputBinder>> {
    explicit.or(default).ok_or_else(|| {
        GateError::config("no input binder configured: pass one to the gate or set a default")
    })
}

/// The built-in binder.
///
/// Produces a document with `method`, `path`, `query` (when present), and a
/// `headers` object with lossy UTF-8 values:
///
/// ```json
/// {
///   "method": "GET",
///   "path": "/api/v1/users",
///   "query": "page=2",
///   "headers": {"x-api-key": "..."}
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBinder;

impl InputBinder for RequestBinder {
    fn bind(&self, request: &Request) -> GateResult<InputDocument> {
        let mut doc = InputDocument::new();
        doc.insert(
            "method".to_string(),
            Value::String(request.method().as_str().to_string()),
        );
        doc.insert(
            "path".to_string(),
            Value::String(request.uri().path().to_string()),
        );
        if let Some(query) = request.uri().query() {
            doc.insert("query".to_string(), Value::String(query.to_string()));
        }

        let headers: serde_json::Map<String, Value> = request
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
                )
            })
            .collect();
        doc.insert("headers".to_string(), Value::Object(headers));

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use serde_json::json;

    fn make_request(method: &str, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", "secret")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_request_binder_shape() {
        let request = make_request("GET", "/api/v1/users?page=2");
        let doc = RequestBinder.bind(&request).unwrap();

        assert_eq!(doc["method"], json!("GET"));
        assert_eq!(doc["path"], json!("/api/v1/users"));
        assert_eq!(doc["query"], json!("page=2"));
        assert_eq!(doc["headers"]["x-api-key"], json!("secret"));
    }

    #[test]
    fn test_request_binder_omits_missing_query() {
        let request = make_request("POST", "/api/v1/users");
        let doc = RequestBinder.bind(&request).unwrap();
        assert!(!doc.contains_key("query"));
    }

    #[test]
    fn test_closure_binder() {
        let binder = |request: &Request| {
            let mut doc = InputDocument::new();
            doc.insert(
                "path".to_string(),
                Value::String(request.uri().path().to_string()),
            );
            Ok(doc)
        };

        let request = make_request("GET", "/health");
        let doc = binder.bind(&request).unwrap();
        assert_eq!(doc["path"], json!("/health"));
    }

    #[test]
    fn test_resolve_prefers_explicit_binder() {
        let explicit: Arc<dyn InputBinder> =
            Arc::new(|_: &Request| -> GateResult<InputDocument> {
                Ok(minos_eval::input_document([("source", json!("explicit"))]))
            });
        let default: Arc<dyn InputBinder> = Arc::new(RequestBinder);

        let binder = resolve(Some(explicit), Some(default)).unwrap();
        let doc = binder.bind(&make_request("GET", "/")).unwrap();
        assert_eq!(doc["source"], json!("explicit"));
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let default: Arc<dyn InputBinder> = Arc::new(RequestBinder);
        let binder = resolve(None, Some(default)).unwrap();
        let doc = binder.bind(&make_request("GET", "/")).unwrap();
        assert_eq!(doc["path"], json!("/"));
    }

    #[test]
    fn test_resolve_without_binder_fails() {
        let result = resolve(None, None);
        assert!(matches!(result, Err(GateError::Config(_))));
    }
}
