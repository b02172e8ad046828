//! Error types for Calcterm.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Calcterm operations.
pub type Result<T> = std::result::Result<T, CalcError>;

/// Errors that can occur in Calcterm.
#[derive(Debug, Error)]
pub enum CalcError {
    /// The inference server could not be reached at all.
    #[error("Failed to connect to Ollama at {url}. Make sure Ollama is running")]
    Unreachable {
        /// Base URL that was tried.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The inference server answered with a non-success status.
    #[error("Ollama returned HTTP error status {status}")]
    HttpStatus {
        /// Status code returned.
        status: u16,
    },

    /// The request failed after the connection was established.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server reported an error inside a successful response.
    #[error("Ollama error: {0}")]
    Stream(String),

    /// A response body could not be decoded.
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The embedded content data is invalid.
    #[error("Invalid content data: {0}")]
    Content(String),

    /// The attached file is not a recognised image.
    #[error("Not an image file: {}", path.display())]
    UnsupportedImage {
        /// Path of the rejected file.
        path: PathBuf,
    },

    /// The attached file exceeds the configured size limit.
    #[error("Image is {size} bytes, limit is {limit} bytes")]
    ImageTooLarge {
        /// File size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Failed to access clipboard.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalcError {
    /// Create an Unreachable error.
    pub fn unreachable(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Unreachable {
            url: url.into(),
            source,
        }
    }

    /// Create an UnsupportedImage error.
    pub fn unsupported_image(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedImage { path: path.into() }
    }

    /// Whether this error means the server is not reachable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
