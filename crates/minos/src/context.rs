//! Per-request scope carried through the pipeline.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use uuid::Uuid;

/// State that flows alongside one request through the middleware chain.
///
/// Created when the request enters the pipeline and dropped when the
/// response leaves it; never shared between requests. Stages communicate
/// through typed extensions (the gate records its [`DecisionOutcome`]
/// here for downstream audit stages).
///
/// [`DecisionOutcome`]: crate::gate::DecisionOutcome
#[derive(Debug)]
pub struct RequestScope {
    /// Unique identifier for this request (UUID v7, time-ordered).
    request_id: Uuid,

    /// When the request entered the pipeline.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestScope {
    /// Creates a scope with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a scope with a request ID provided by an upstream service.
    #[must_use]
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the elapsed time since the request entered the pipeline.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Checks whether an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}
