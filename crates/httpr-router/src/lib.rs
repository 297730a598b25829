//! httpr-router: Zero-dependency single-wildcard path matcher
//!
//! Route and mount patterns used by httpr-core are compared against the
//! bare request path (query string already removed) with this matcher.
//!
//! ## Pattern Syntax
//! - Every character matches itself literally
//! - The first `*` is a wildcard segment: it matches any run of characters
//!   other than `/`, including the empty run
//! - Any later `*` matches a literal `*`
//!
//! ## Matching Modes
//! 1. Exact: the pattern must consume the whole path (routes)
//! 2. Prefix: the pattern must consume a leading part of the path (mounts);
//!    the rest is handed to the mounted router
//!
//! ## Example
//! ```
//! use httpr_router::Pattern;
//!
//! let pattern = Pattern::new("/user/*");
//! assert!(pattern.matches("/user/42"));
//! assert!(!pattern.matches("/user/42/details"));
//!
//! let m = pattern.strip_prefix("/user/42/details").unwrap();
//! assert_eq!(m.matched, "/user/42");
//! assert_eq!(m.remainder, "/details");
//! ```

use std::fmt;

/// Wildcard marker
pub const WILDCARD: char = '*';

/// Result of a prefix match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
    /// Leading part of the path consumed by the pattern
    pub matched: &'a str,
    /// Remaining path, always starting with `/`
    pub remainder: String,
}

/// Compiled route or mount pattern
///
/// The pattern is split once at its first `*` so matching never
/// re-parses the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    raw: String,
    /// Literal text before the wildcard (whole pattern if there is none)
    head: String,
    /// Literal text after the wildcard, `None` without a wildcard
    tail: Option<String>,
}

impl Pattern {
    /// Compile a pattern
    ///
    /// # Example
    /// ```
    /// use httpr_router::Pattern;
    ///
    /// let pattern = Pattern::new("/files/*.txt");
    /// assert!(pattern.has_wildcard());
    /// assert!(pattern.matches("/files/notes.txt"));
    /// ```
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (head, tail) = match raw.split_once(WILDCARD) {
            Some((head, tail)) => (head.to_string(), Some(tail.to_string())),
            None => (raw.clone(), None),
        };
        Self { raw, head, tail }
    }

    /// The pattern as registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern contains a wildcard segment
    pub fn has_wildcard(&self) -> bool {
        self.tail.is_some()
    }

    /// Exact match against the whole path
    pub fn matches(&self, path: &str) -> bool {
        self.capture(path).is_some()
    }

    /// Exact match returning the text consumed by the wildcard
    ///
    /// Patterns without a wildcard capture the empty string.
    ///
    /// # Example
    /// ```
    /// use httpr_router::Pattern;
    ///
    /// let pattern = Pattern::new("/user/*/details");
    /// assert_eq!(pattern.capture("/user/7/details"), Some("7"));
    /// assert_eq!(pattern.capture("/user/7/8/details"), None);
    /// ```
    pub fn capture<'a>(&self, path: &'a str) -> Option<&'a str> {
        let tail = match &self.tail {
            Some(tail) => tail,
            None => return (path == self.head).then_some(""),
        };

        if path.len() < self.head.len() + tail.len() {
            return None;
        }
        let rest = path.strip_prefix(self.head.as_str())?;
        let segment = rest.strip_suffix(tail.as_str())?;
        if segment.contains('/') {
            return None;
        }
        Some(segment)
    }

    /// Anchored prefix match, returning the number of bytes consumed
    ///
    /// The wildcard is greedy: the longest `/`-free run after which the
    /// rest of the pattern still matches is taken.
    pub fn match_prefix(&self, path: &str) -> Option<usize> {
        let rest = path.strip_prefix(self.head.as_str())?;
        let tail = match &self.tail {
            Some(tail) => tail,
            None => return Some(self.head.len()),
        };

        let limit = rest.find('/').unwrap_or(rest.len());
        (0..=limit)
            .rev()
            .filter(|&end| rest.is_char_boundary(end))
            .find(|&end| rest[end..].starts_with(tail.as_str()))
            .map(|end| self.head.len() + end + tail.len())
    }

    /// Anchored prefix match, returning the consumed part and the
    /// normalized remainder handed to a mounted router
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<PrefixMatch<'a>> {
        let consumed = self.match_prefix(path)?;
        let (matched, rest) = path.split_at(consumed);
        let remainder = if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{}", rest)
        };
        Some(PrefixMatch { matched, remainder })
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Pattern::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Pattern::new(raw)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
