//! Fixed response header middleware

use crate::{Request, Response};
use super::Middleware;

/// Sets one response header on every request it sees
#[derive(Debug, Clone)]
pub struct SetHeader {
    name: String,
    value: String,
}

impl SetHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Middleware for SetHeader {
    fn process(&self, _req: &mut Request, res: &mut Response) {
        res.set_header(self.name.clone(), self.value.clone());
    }
}
