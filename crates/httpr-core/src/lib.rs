//! httpr-core: Embeddable HTTP request router
//!
//! Route tables keyed by method and path pattern, routers mounted under
//! prefixes of other routers, global and per-route middleware, and a
//! static file responder. The routing core is synchronous and transport
//! agnostic; the hyper server lives behind the `native` feature.
//!
//! ## Features
//! - `native` - HTTP/1.1 server with tokio/hyper (default)

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod request;
pub mod response;
pub mod cookie;
pub mod router;
pub mod middleware;
pub mod dispatcher;
pub mod handlers;
pub mod app;

#[cfg(feature = "native")]
pub mod server;

// Re-exports
pub use error::{Error, Result};
pub use request::{Headers, Request, RequestBuilder};
pub use response::{Response, ResponseHeaders, StatusCode};
pub use cookie::Cookie;
pub use router::{Handler, Mount, Route, Router};
pub use dispatcher::dispatch;
pub use app::App;
pub use httpr_router::Pattern;

// Middleware re-exports
pub use middleware::{Middleware, MiddlewareChain, RequestLog, RequestLogConfig, SetHeader};

// Handlers re-exports
pub use handlers::{StaticFileConfig, StaticFiles};

#[cfg(feature = "native")]
pub use server::{ServerConfig, create_listener, from_hyper_request, to_hyper_response, serve_with_shutdown};
