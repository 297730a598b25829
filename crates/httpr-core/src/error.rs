//! Error types for httpr-core

use thiserror::Error;

/// Result type alias for httpr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for router assembly and serving
///
/// Routing itself never fails: an unmatched request becomes a 404
/// response and filesystem problems in the static responder become
/// 403/404/500 responses.
#[derive(Debug, Error)]
pub enum Error {
    /// A router was already mounted under this prefix on the same parent
    #[error("Router already mounted at prefix: {0}")]
    DuplicateMount(String),

    /// Listen address could not be parsed
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    /// IO error (native only)
    #[cfg(feature = "native")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
