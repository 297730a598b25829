//! Route table and router tree
//!
//! A [`Router`] owns an ordered route table and an ordered list of mounted
//! child routers. Order is priority: the first route (or mount) that
//! matches wins, so a later registration with the same method and pattern
//! is never reached.
//!
//! Children are held as `Arc<Router>` and can be mounted under several
//! parents. A router can only be changed while it is uniquely owned, so it
//! can never end up mounted beneath itself.

use crate::middleware::{Middleware, MiddlewareChain};
use crate::{Error, Request, Response, Result};
use httpr_router::{Pattern, PrefixMatch};
use std::sync::Arc;

/// Route handler
pub type Handler = Arc<dyn Fn(&Request, &mut Response) + Send + Sync>;

/// A single (method, pattern, handler, local middleware) registration
pub struct Route {
    method: String,
    pattern: Pattern,
    handler: Handler,
    middlewares: MiddlewareChain,
}

impl Route {
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<Pattern>,
        handler: Handler,
        middlewares: MiddlewareChain,
    ) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            handler,
            middlewares,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn middlewares(&self) -> &MiddlewareChain {
        &self.middlewares
    }

    /// Method is compared exactly (case-sensitive), the path must match the
    /// whole pattern
    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.pattern.matches(path)
    }

    /// Run local middleware in order, then the handler
    pub fn invoke(&self, req: &mut Request, res: &mut Response) {
        self.middlewares.run(req, res);
        (self.handler)(&*req, res);
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("middlewares", &self.middlewares)
            .finish()
    }
}

/// A child router mounted under a prefix pattern
#[derive(Debug, Clone)]
pub struct Mount {
    pattern: Pattern,
    router: Arc<Router>,
}

impl Mount {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}

/// Router tree node
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    mounts: Vec<Mount>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route without local middleware
    pub fn route<H>(&mut self, method: &str, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.route_with(method, pattern, handler, Vec::<Arc<dyn Middleware>>::new())
    }

    /// Add a route with local middleware, run in the given order when this
    /// route is the one matched
    pub fn route_with<H, I>(&mut self, method: &str, pattern: &str, handler: H, middlewares: I) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.routes.push(Route::new(
            method,
            pattern,
            Arc::new(handler),
            middlewares.into_iter().collect(),
        ));
        self
    }

    /// Add a GET route
    pub fn get<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.route("GET", pattern, handler)
    }

    /// Add a POST route
    pub fn post<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.route("POST", pattern, handler)
    }

    /// Add a PUT route
    pub fn put<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.route("PUT", pattern, handler)
    }

    /// Add a DELETE route
    pub fn delete<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.route("DELETE", pattern, handler)
    }

    /// Mount a child router under a prefix pattern
    ///
    /// Fails if this router already has a child under the same prefix.
    pub fn mount(&mut self, prefix: &str, router: Arc<Router>) -> Result<&mut Self> {
        if self.mounts.iter().any(|m| m.pattern.as_str() == prefix) {
            return Err(Error::DuplicateMount(prefix.to_string()));
        }
        self.mounts.push(Mount {
            pattern: Pattern::new(prefix),
            router,
        });
        Ok(self)
    }

    /// Routes in priority order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mounts in priority order
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    /// First route whose method and pattern match
    pub fn find_route(&self, method: &str, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(method, path))
    }

    /// First mount whose pattern matches a prefix of the path
    pub fn find_mount<'a>(&self, path: &'a str) -> Option<(&Mount, PrefixMatch<'a>)> {
        self.mounts
            .iter()
            .find_map(|m| m.pattern.strip_prefix(path).map(|matched| (m, matched)))
    }
}
