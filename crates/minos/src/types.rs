//! Common HTTP types used by the gate.
//!
//! This module re-exports the request and response types the middleware
//! operates on and helpers for the gate's JSON error bodies.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type flowing through the pipeline.
///
/// A standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type flowing through the pipeline.
///
/// A standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building the gate's terminal responses.
pub trait ResponseExt {
    /// A JSON response with body `{"error": <message>}` and the given status.
    ///
    /// This is the exact wire shape for both denials and internal errors;
    /// only the status code distinguishes them.
    fn policy_error(status: http::StatusCode, message: &str) -> Response;

    /// A 500 response with body `{"error": <message>}`.
    fn internal_error(message: &str) -> Response;
}

impl ResponseExt for Response {
    fn policy_error(status: http::StatusCode, message: &str) -> Response {
        let body = serde_json::json!({ "error": message });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build policy error response")
    }

    fn internal_error(message: &str) -> Response {
        Self::policy_error(http::StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}
