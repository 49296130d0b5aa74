//! Error types for the platform client.

use thiserror::Error;

/// Errors produced while talking to the remote platform.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("platform API error ({status}): {message}")]
    Api { status: String, message: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("platform session is not initialized: {guidance}")]
    Uninitialized { guidance: String },

    #[error("decoding response: {0}")]
    Decode(String),

    #[error("core error: {0}")]
    Core(#[from] floodmap_core::Error),
}

/// Result alias for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
