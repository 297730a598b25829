//! Request dispatch through a router tree
//!
//! ```text
//! dispatch(req, res, root, global)
//!   global middleware, once
//!   └─ descend(root)
//!        1. first route with equal method and matching pattern
//!           → local middleware, handler, done
//!        2. first mount whose pattern matches a prefix of the path
//!           → descend(child) with a forwarded request, done
//!        3. 404 Not Found
//! ```
//!
//! Panics raised by handlers or middleware pass straight through; the
//! recovery boundary is [`crate::App::handle`].

use crate::middleware::MiddlewareChain;
use crate::{Request, Response, Router, StatusCode};
use tracing::debug;

/// Dispatch a request through `router`
///
/// `global` runs exactly once, before any matching, no matter how deep the
/// request travels through mounted routers. Every effect lands on `res`.
pub fn dispatch(req: &mut Request, res: &mut Response, router: &Router, global: &MiddlewareChain) {
    global.run(req, res);
    descend(req, res, router, 0);
}

fn descend(req: &mut Request, res: &mut Response, router: &Router, depth: usize) {
    // Local middleware may touch request headers, so the path is copied out
    let path = req.bare_path().to_string();

    if let Some(route) = router.find_route(req.method(), &path) {
        debug!(
            depth,
            method = req.method(),
            path = %path,
            pattern = %route.pattern(),
            "route matched"
        );
        route.invoke(req, res);
        return;
    }

    if let Some((mount, matched)) = router.find_mount(&path) {
        debug!(
            depth,
            prefix = %mount.pattern(),
            matched = matched.matched,
            remainder = %matched.remainder,
            "descending into mounted router"
        );
        // The query string is not carried into the child
        let mut forwarded = req.forward(matched.remainder);
        descend(&mut forwarded, res, mount.router(), depth + 1);
        return;
    }

    debug!(depth, method = req.method(), path = %path, "no route matched");
    res.set_status_page(StatusCode::NOT_FOUND);
}
