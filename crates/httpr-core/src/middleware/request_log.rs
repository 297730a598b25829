//! Request logging middleware
//!
//! Emits one `tracing` event per request and tags it with a request ID.

use crate::{Request, Response};
use super::Middleware;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Request log configuration
#[derive(Debug, Clone)]
pub struct RequestLogConfig {
    /// Header carrying the request ID
    pub header_name: String,
    /// Generate a request ID if the client sent none
    pub generate_id: bool,
    /// Echo the request ID on the response
    pub echo_id: bool,
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            header_name: "X-Request-Id".to_string(),
            generate_id: true,
            echo_id: true,
        }
    }
}

impl RequestLogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn generate_id(mut self, generate: bool) -> Self {
        self.generate_id = generate;
        self
    }

    pub fn echo_id(mut self, echo: bool) -> Self {
        self.echo_id = echo;
        self
    }
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a short request ID (8 base62 characters)
pub fn generate_short_id() -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut bytes = [0u8; 8];
    fill_random(&mut bytes);

    bytes.iter().map(|&b| ALPHABET[(b as usize) % ALPHABET.len()] as char).collect()
}

/// Fill buffer with pseudo-random bytes
///
/// xorshift64 seeded from the clock and a process-wide counter, so two
/// calls in the same nanosecond still differ.
fn fill_random(buf: &mut [u8]) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut seed = nanos ^ count.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;

    for byte in buf.iter_mut() {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        *byte = (seed & 0xff) as u8;
    }
}

/// Request logging middleware
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    config: RequestLogConfig,
}

impl RequestLog {
    pub fn new(config: RequestLogConfig) -> Self {
        Self { config }
    }
}

impl Middleware for RequestLog {
    fn process(&self, req: &mut Request, res: &mut Response) {
        let existing = req.header(&self.config.header_name).map(str::to_string);
        let request_id = match existing {
            Some(id) => Some(id),
            None if self.config.generate_id => {
                let id = generate_short_id();
                req.set_header(self.config.header_name.clone(), id.clone());
                Some(id)
            }
            None => None,
        };

        if let (true, Some(id)) = (self.config.echo_id, &request_id) {
            res.set_header(self.config.header_name.clone(), id.clone());
        }

        tracing::info!(
            request_id = request_id.as_deref().unwrap_or("-"),
            method = req.method(),
            path = req.path(),
            "request"
        );
    }
}
