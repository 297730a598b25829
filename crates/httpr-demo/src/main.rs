//! httpr demo server
//!
//! Serves a small site: a home page, an `/api` router with a nested
//! per-user router, and files from a static directory.
//!
//! ```text
//! GET    /                      home page
//! GET    /api/users             list users
//! POST   /api/users             create user
//! GET    /api/user/{id}/details user details
//! PUT    /api/user/{id}/details update user
//! DELETE /api/user/{id}/details delete user
//! GET    /static?path=...       static files
//! ```

use clap::Parser;
use httpr_core::{
    App, Middleware, Request, RequestLog, Response, Router, ServerConfig, StaticFiles,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "httpr-demo")]
#[command(about = "httpr demo server", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HTTPR_HOSTNAME", default_value = "0.0.0.0")]
    hostname: String,

    /// Port to listen on
    #[arg(short, long, env = "HTTPR_PORT", default_value_t = 8080)]
    port: u16,

    /// Runtime worker threads (defaults to the number of CPUs)
    #[arg(short, long, env = "HTTPR_WORKERS")]
    workers: Option<usize>,

    /// Directory served under /static
    #[arg(long, env = "HTTPR_STATIC_DIR", default_value = "./static")]
    static_dir: PathBuf,
}

/// Tags every response and remembers the visitor in a cookie
struct Visitor;

impl Middleware for Visitor {
    fn process(&self, req: &mut Request, res: &mut Response) {
        res.set_header("X-Custom-Header", "Middleware-Value");
        info!(
            path = req.path(),
            x = req.query_param("x").unwrap_or("-"),
            check = req.cookie("check").unwrap_or(""),
            "visitor"
        );
        res.set_cookie("check", "value");
    }
}

fn build_app(static_dir: PathBuf) -> httpr_core::Result<App> {
    let mut app = App::new();
    app.use_middleware(RequestLog::default());
    app.use_middleware(Visitor);

    app.add_route("GET", "/", |_: &Request, res: &mut Response| {
        res.set_body("Welcome to the home page!");
    });

    let mut user = Router::new();
    user.get("/details", |_: &Request, res: &mut Response| res.set_body("User details"))
        .put("/details", |_: &Request, res: &mut Response| {
            res.set_body("User details updated")
        })
        .delete("/details", |_: &Request, res: &mut Response| res.set_body("User deleted"));

    let mut api = Router::new();
    api.get("/users", |_: &Request, res: &mut Response| res.set_body("List of users"))
        .post("/users", |_: &Request, res: &mut Response| res.set_body("User created"));
    api.mount("/user/*", Arc::new(user))?;

    app.use_router("/api", Arc::new(api))?;

    let files = StaticFiles::root(static_dir);
    app.add_route("GET", "/static", move |req: &Request, res: &mut Response| {
        match req.query_param("path") {
            Some(path) => files.handle(path, res),
            None => res.set_body("No path given"),
        }
    });

    Ok(app)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "httpr_demo=info,httpr_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::new(cli.port).hostname(cli.hostname);
    if let Some(workers) = cli.workers {
        config = config.workers(workers);
    }

    let app = build_app(cli.static_dir)?;
    info!(port = config.port, workers = config.workers, "starting httpr demo");
    app.run(&config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpr_core::StatusCode;
    use std::fs;

    fn app() -> App {
        build_app(PathBuf::from("./does-not-exist")).unwrap()
    }

    #[test]
    fn test_home_page() {
        let res = app().handle(Request::new("GET", "/?x=1"));
        assert_eq!(res.body_string().as_deref(), Some("Welcome to the home page!"));
        assert_eq!(res.header("X-Custom-Header"), Some("Middleware-Value"));
        assert_eq!(res.header("Set-Cookie"), Some("check=value; Path=/"));
        assert!(res.header("X-Request-Id").is_some());
    }

    #[test]
    fn test_api_routes() {
        let app = app();
        let cases = [
            ("GET", "/api/users", "List of users"),
            ("POST", "/api/users", "User created"),
            ("GET", "/api/user/42/details", "User details"),
            ("PUT", "/api/user/42/details", "User details updated"),
            ("DELETE", "/api/user/42/details", "User deleted"),
        ];
        for (method, path, body) in cases {
            let res = app.handle(Request::new(method, path));
            assert_eq!(res.status(), StatusCode::OK, "{} {}", method, path);
            assert_eq!(res.body_string().as_deref(), Some(body));
        }
    }

    #[test]
    fn test_unknown_route() {
        let res = app().handle(Request::new("GET", "/api/user/42/settings"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body_string().as_deref(), Some("404 Not Found"));
    }

    #[test]
    fn test_static_without_path() {
        let res = app().handle(Request::new("GET", "/static"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body_string().as_deref(), Some("No path given"));
    }

    #[test]
    fn test_static_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "hi there").unwrap();
        let app = build_app(dir.path().to_path_buf()).unwrap();

        let res = app.handle(Request::new("GET", "/static?path=hello.txt"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.content_type(), Some("text/plain"));
        assert_eq!(res.body_string().as_deref(), Some("hi there"));

        let res = app.handle(Request::new("GET", "/static?path=missing.txt"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app.handle(Request::new("GET", "/static?path=../escape"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
