//! The middleware seam the host pipeline embeds.
//!
//! Minos does not own a server loop. The host framework drives requests
//! through implementations of [`Middleware`], each receiving the request, a
//! mutable [`RequestScope`], and a [`Next`] continuation for the rest of the
//! pipeline. A middleware that does not call `next.run()` short-circuits the
//! request with its own response.

use std::future::Future;
use std::pin::Pin;

use crate::context::RequestScope;
use crate::types::{Request, Response};

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single stage in the host's request pipeline.
///
/// # Invariants
///
/// - A stage calls `next.run()` exactly once, unless it short-circuits.
/// - A stage must not retain per-request state past the call.
pub trait Middleware: Send + Sync + 'static {
    /// The unique name of this stage, for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Process one request through this stage.
    fn process<'a>(
        &'a self,
        scope: &'a mut RequestScope,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The continuation for the rest of the pipeline.
///
/// Consumed by [`Next::run`], so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain: invoke the handler.
    Handler(Box<dyn FnOnce(&mut RequestScope, Request) -> BoxFuture<'static, Response> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// A continuation that runs `middleware`, then `next`.
    pub fn chain(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// A terminal continuation that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestScope, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invoke the next stage or the handler.
    pub async fn run(self, scope: &mut RequestScope, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(scope, request, *next).await
            }
            NextInner::Handler(handler) => handler(scope, request).await,
        }
    }
}
