//! Application assembly
//!
//! [`App`] collects global middleware, routes and mounted routers during
//! start-up. Once serving begins it is shared read-only (`Arc<App>`), so
//! nothing can be registered concurrently with request handling.

use crate::middleware::{Middleware, MiddlewareChain};
use crate::{dispatch, Request, Response, Result, Router, StatusCode};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// Root router plus global middleware
#[derive(Debug, Default)]
pub struct App {
    router: Router,
    middlewares: MiddlewareChain,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root router
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Root router, for registration
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Global middleware in run order
    pub fn middlewares(&self) -> &MiddlewareChain {
        &self.middlewares
    }

    /// Add global middleware, run once per request before matching
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middlewares.add(middleware);
        self
    }

    /// Add a global middleware instance that is also used elsewhere
    pub fn use_shared(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.add_shared(middleware);
        self
    }

    /// Mount a router under a prefix of the root router
    pub fn use_router(&mut self, prefix: &str, router: Arc<Router>) -> Result<&mut Self> {
        self.router.mount(prefix, router)?;
        Ok(self)
    }

    /// Add a route to the root router
    pub fn add_route<H>(&mut self, method: &str, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.router.route(method, pattern, handler);
        self
    }

    /// Add a route with local middleware to the root router
    pub fn add_route_with<H, I>(&mut self, method: &str, pattern: &str, handler: H, middlewares: I) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.router.route_with(method, pattern, handler, middlewares);
        self
    }

    /// Dispatch one request and return the finished response
    ///
    /// This is the recovery boundary for handler and middleware panics: a
    /// panic anywhere in dispatch is logged and turned into a fresh
    /// `500 Internal Server Error` response. Whatever the failed dispatch
    /// had written (headers, cookies) is discarded.
    pub fn handle(&self, mut req: Request) -> Response {
        let method = req.method().to_string();
        let path = req.path().to_string();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut res = Response::ok();
            dispatch(&mut req, &mut res, &self.router, &self.middlewares);
            res
        }));

        match outcome {
            Ok(res) => res,
            Err(payload) => {
                error!(
                    method = %method,
                    path = %path,
                    panic = panic_message(payload.as_ref()),
                    "request handler panicked"
                );
                Response::status_page(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
