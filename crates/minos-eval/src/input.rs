//! The input document handed to the policy evaluator.

use serde_json::{Map, Value};

/// Structured data extracted from a request for policy evaluation.
///
/// A flat JSON object: string keys to arbitrary JSON values. Built fresh for
/// each request and immutable once handed to the dispatcher.
pub type InputDocument = Map<String, Value>;

/// Build an [`InputDocument`] from key/value pairs.
///
/// # Example
///
/// ```
/// use minos_eval::input_document;
///
/// let doc = input_document([
///     ("method", "GET".into()),
///     ("path", "/api/v1/users".into()),
/// ]);
/// assert_eq!(doc["method"], "GET");
/// ```
pub fn input_document<K, I>(pairs: I) -> InputDocument
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
