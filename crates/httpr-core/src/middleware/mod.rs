//! Middleware
//!
//! A middleware sees the in-flight request and response and may change
//! either. Middleware never calls a successor: whoever owns the chain runs
//! each entry exactly once, in registration order. Global middleware is run
//! by the dispatcher before any matching; route-local middleware runs only
//! when its route is the one selected, right before the handler.

pub mod headers;
pub mod request_log;

pub use headers::SetHeader;
pub use request_log::{RequestLog, RequestLogConfig};

use crate::{Request, Response};
use std::sync::Arc;

/// Middleware trait - observe and mutate a request/response pair
pub trait Middleware: Send + Sync {
    fn process(&self, req: &mut Request, res: &mut Response);
}

impl<F> Middleware for F
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn process(&self, req: &mut Request, res: &mut Response) {
        self(req, res)
    }
}

/// Ordered middleware list
///
/// Entries are reference counted so the same middleware instance can be
/// attached globally and to any number of routes.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub fn add_shared(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run every middleware once, in registration order
    pub fn run(&self, req: &mut Request, res: &mut Response) {
        for m in &self.middlewares {
            m.process(req, res);
        }
    }
}

impl FromIterator<Arc<dyn Middleware>> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Middleware>>>(iter: I) -> Self {
        Self {
            middlewares: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.middlewares.len())
            .finish()
    }
}
