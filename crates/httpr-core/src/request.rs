//! HTTP Request types

use smallvec::SmallVec;
use std::collections::HashMap;

/// Header storage (stack-allocated for small header counts)
pub type Headers = SmallVec<[(String, String); 16]>;

/// HTTP Request
///
/// Method and path are fixed at construction; the query parameters are
/// parsed from the path once, right then. Only headers can change
/// afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method, compared case-sensitively by the router
    method: String,
    /// Request target as received (path plus optional query string)
    path: String,
    /// Headers, names kept exactly as received
    headers: Headers,
    /// Query parameters parsed from `path`
    query: HashMap<String, String>,
}

impl Request {
    /// Create a new request without headers
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_headers(method, path, Headers::new())
    }

    /// Create a new request carrying the given headers
    pub fn with_headers(
        method: impl Into<String>,
        path: impl Into<String>,
        headers: Headers,
    ) -> Self {
        let path = path.into();
        let query = parse_query(&path);
        Self {
            method: method.into(),
            path,
            headers,
            query,
        }
    }

    /// Build a request for a mounted router: same method and headers,
    /// different path
    pub fn forward(&self, path: impl Into<String>) -> Self {
        Self::with_headers(self.method.clone(), path, self.headers.clone())
    }

    /// HTTP method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path including the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path with the query string removed
    pub fn bare_path(&self) -> &str {
        match self.path.find('?') {
            Some(pos) => &self.path[..pos],
            None => &self.path,
        }
    }

    /// Get a header value (names are case-sensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All headers in insertion order
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Set a header, replacing an existing value with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Get a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// All query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Get a cookie value from the `Cookie` header
    ///
    /// A cookie is recognised at the start of the header or right after a
    /// `"; "` separator; its value runs up to the next `;`.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let header = self.header("Cookie")?;
        header.split("; ").find_map(|pair| {
            let value = pair.strip_prefix(name)?.strip_prefix('=')?;
            Some(value.split(';').next().unwrap_or(""))
        })
    }

    /// Overwrite the request-side `Cookie` header with a single `name=value`
    ///
    /// This replaces every cookie the client sent. It exists so middleware
    /// can inject a synthetic cookie for later handlers.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.set_header("Cookie", format!("{}={}", name, value));
    }
}

/// Builder for constructing requests
pub struct RequestBuilder {
    method: String,
    path: String,
    headers: Headers,
}

impl RequestBuilder {
    /// Create a new builder
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Headers::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build the request
    pub fn build(self) -> Request {
        Request::with_headers(self.method, self.path, self.headers)
    }
}

/// Split the query string on `&`, then each pair on `=`
///
/// Pairs that do not have exactly one `=` are dropped. Values are taken
/// verbatim (no percent-decoding); a repeated key keeps the last value.
fn parse_query(path: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let query = match path.split_once('?') {
        Some((_, query)) => query,
        None => return params,
    };

    for pair in query.split('&') {
        let mut parts = pair.split('=');
        if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            params.insert(key.to_string(), value.to_string());
        }
    }
    params
}
