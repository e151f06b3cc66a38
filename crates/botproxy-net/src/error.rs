//! Error types

use std::path::PathBuf;

/// Proxy injection errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration document is not valid JSON
    #[error("Failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        /// Offending document
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration document has the wrong shape
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Proxy URI could not be turned into a descriptor
    #[error("Invalid proxy URI {uri:?}: {reason}")]
    InvalidProxyUri {
        /// Raw value from the configuration
        uri: String,
        /// Why it was rejected
        reason: String,
    },

    /// Identity could not be recovered from a host object
    #[error("Identity resolution failed: {0}")]
    Identity(String),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
