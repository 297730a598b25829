//! Native HTTP server
//!
//! hyper HTTP/1.1 on a multi-threaded tokio runtime. The router core is
//! synchronous, so each request is dispatched on tokio's blocking pool and
//! handlers are free to block (file reads in the static responder, for
//! instance).

use crate::{App, Error, Request, Response, Result};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
    /// Runtime worker threads used by [`App::run`]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "0.0.0.0".to_string(),
            port: 3000,
            workers: num_cpus::get(),
        }
    }
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Socket address to bind
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.hostname, self.port)
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("{}:{}", self.hostname, self.port)))
    }
}

/// Create a listening TCP socket
pub fn create_listener(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // TCP_NODELAY - disable Nagle's algorithm for lower latency
    socket.set_nodelay(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    Ok(socket)
}

/// Normalize a header name to `Title-Case`
///
/// hyper lowercases incoming header names, while request headers are
/// matched case-sensitively and looked up by their `Title-Case` spelling
/// (`Cookie`, `Content-Type`, `X-Request-Id`).
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}

/// Convert a hyper request head to our Request type
///
/// Header names are stored in `Title-Case`, so `x-foo` and `X-Foo` on the
/// wire both arrive as `X-Foo`; the original spelling is not kept. Header
/// values that are not visible ASCII are skipped. The body is not read.
pub fn from_hyper_request<B>(req: &hyper::Request<B>) -> Request {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut request = Request::new(req.method().as_str(), target);
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.set_header(title_case(name.as_str()), v);
        }
    }
    request
}

/// Convert our Response to a hyper Response
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let (status, headers, body) = res.into_parts();
    let mut builder = hyper::Response::builder().status(status.as_u16());

    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        error!(error = %e, "invalid response head");
        internal_error()
    })
}

fn internal_error() -> hyper::Response<Full<Bytes>> {
    let mut res = hyper::Response::new(Full::new(Bytes::from_static(b"500 Internal Server Error")));
    *res.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    res
}

async fn handle(app: Arc<App>, req: hyper::Request<Incoming>) -> hyper::Response<Full<Bytes>> {
    let request = from_hyper_request(&req);
    drop(req);

    match tokio::task::spawn_blocking(move || app.handle(request)).await {
        Ok(res) => to_hyper_response(res),
        Err(e) => {
            error!(error = %e, "dispatch task failed");
            internal_error()
        }
    }
}

/// Serve connections from `listener` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(app: Arc<App>, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    debug!(error = %e, "accept failed");
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
        };

        let app = app.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let app = app.clone();
                async move { Ok::<_, Infallible>(handle(app, req).await) }
            });

            if let Err(e) = http1::Builder::new()
                .title_case_headers(true)
                .keep_alive(false)
                .serve_connection(io, service)
                .await
            {
                debug!(peer = %peer, error = %e, "connection error");
            }
        });
    }
}

/// Bind according to `config` and serve until Ctrl-C
pub async fn serve(app: Arc<App>, config: &ServerConfig) -> Result<()> {
    let addr = config.addr()?;
    let socket = create_listener(&addr)?;
    let listener = TcpListener::from_std(socket.into())?;
    info!(addr = %addr, "listening");

    serve_with_shutdown(app, listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await
}

impl App {
    /// Build a runtime and serve this app until Ctrl-C
    pub fn run(self, config: &ServerConfig) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.workers.max(1))
            .enable_all()
            .build()?;

        runtime.block_on(serve(Arc::new(self), config))
    }
}
