//! HTTP Response types

use crate::cookie::Cookie;
use bytes::Bytes;
use smallvec::SmallVec;

/// Response header storage
pub type ResponseHeaders = SmallVec<[(String, String); 8]>;

/// HTTP Status Code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Get the numeric code
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Get the reason phrase
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// HTTP Response
///
/// Starts out as an empty `200 OK` and is filled in by middleware and the
/// matched handler. The body and its `Content-Length` are always written
/// together through [`Response::set_body`].
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: ResponseHeaders,
    body: Bytes,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: SmallVec::new(),
            body: Bytes::new(),
        }
    }

    /// Create a 200 OK response
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Create a plain status response whose body is `"<code> <reason>"`
    pub fn status_page(status: StatusCode) -> Self {
        let mut res = Self::new(status);
        res.set_status_page(status);
        res
    }

    /// Set the status and a `"<code> <reason>"` body, keeping headers
    pub fn set_status_page(&mut self, status: StatusCode) {
        self.status = status;
        self.set_body(status.to_string());
    }

    /// Status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Set status code
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in insertion order
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some((_, v)) => *v = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Get content-type header
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Response body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get body as string (if UTF-8)
    pub fn body_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(|s| s.to_string())
    }

    /// Replace the body and update `Content-Length` to match
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        let len = self.body.len().to_string();
        self.set_header("Content-Length", len);
    }

    /// Set `Set-Cookie` to `name=value; Path=/`
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.add_cookie(&Cookie::new(name, value));
    }

    /// Set `Set-Cookie` with an explicit path and optional `Max-Age`
    pub fn set_cookie_with(&mut self, name: &str, value: &str, path: &str, max_age: Option<u64>) {
        let mut cookie = Cookie::new(name, value).path(path);
        cookie.max_age = max_age;
        self.add_cookie(&cookie);
    }

    /// Set `Set-Cookie` from a prepared cookie
    ///
    /// Only one `Set-Cookie` header is kept; a later call replaces it.
    pub fn add_cookie(&mut self, cookie: &Cookie) {
        self.set_header("Set-Cookie", cookie.to_header_value());
    }

    /// Split into status, headers and body for the transport
    pub fn into_parts(self) -> (StatusCode, ResponseHeaders, Bytes) {
        (self.status, self.headers, self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(StatusCode::OK.to_string(), "200 OK");
        assert_eq!(StatusCode::FORBIDDEN.to_string(), "403 Forbidden");
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.to_string(), "500 Internal Server Error");
        assert_eq!(StatusCode(418).to_string(), "418 Unknown");
    }

    #[test]
    fn test_default_is_ok() {
        let res = Response::default();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body().is_empty());
        assert!(res.headers().is_empty());
    }

    #[test]
    fn test_set_body_sets_content_length() {
        let mut res = Response::ok();
        res.set_body("Hello");
        assert_eq!(res.header("Content-Length"), Some("5"));

        res.set_body("Hi");
        assert_eq!(res.header("content-length"), Some("2"));
        assert_eq!(res.body_string().as_deref(), Some("Hi"));
        assert_eq!(res.headers().len(), 1);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = Response::ok();
        res.set_header("X-Custom-Header", "a");
        res.set_header("x-custom-header", "b");
        assert_eq!(res.header("X-Custom-Header"), Some("b"));
        assert_eq!(res.headers().len(), 1);
    }

    #[test]
    fn test_set_cookie_default() {
        let mut res = Response::ok();
        res.set_cookie("check", "value");
        assert_eq!(res.header("Set-Cookie"), Some("check=value; Path=/"));
    }

    #[test]
    fn test_set_cookie_with_max_age() {
        let mut res = Response::ok();
        res.set_cookie_with("check", "value", "/api", Some(60));
        assert_eq!(res.header("Set-Cookie"), Some("check=value; Path=/api; Max-Age=60"));

        res.set_cookie_with("other", "v", "/", None);
        assert_eq!(res.header("Set-Cookie"), Some("other=v; Path=/"));
    }

    #[test]
    fn test_status_page() {
        let res = Response::status_page(StatusCode::NOT_FOUND);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body_string().as_deref(), Some("404 Not Found"));
    }
}
