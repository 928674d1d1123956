//! Remote store error types
//!
//! Structured errors for remote repository operations.
//! Maps HTTP status codes to specific variants for retry and I/O kind decisions.

use std::io;

/// Remote store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unauthorized: credentials rejected")]
    Unauthorized,

    #[error("Rate limited, try again after backoff")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request error: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl StoreError {
    /// Map the error to the closest `std::io::ErrorKind`
    pub fn to_io_kind(&self) -> io::ErrorKind {
        match self {
            StoreError::Unauthorized => io::ErrorKind::PermissionDenied,
            StoreError::RateLimited => io::ErrorKind::WouldBlock,
            StoreError::NotFound(_) => io::ErrorKind::NotFound,
            StoreError::Forbidden(_) => io::ErrorKind::PermissionDenied,
            StoreError::Network(_) => io::ErrorKind::ConnectionAborted,
            StoreError::Server(_, _) => io::ErrorKind::Other,
            StoreError::Timeout => io::ErrorKind::TimedOut,
            StoreError::Request(_) => io::ErrorKind::Other,
            StoreError::Decode(_) => io::ErrorKind::InvalidData,
            StoreError::ChecksumMismatch { .. } => io::ErrorKind::InvalidData,
        }
    }

    /// Whether this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::RateLimited
                | StoreError::Timeout
                | StoreError::Network(_)
                | StoreError::Server(_, _)
        )
    }

    /// Create a StoreError from an HTTP status code and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => StoreError::Unauthorized,
            403 => StoreError::Forbidden(body.to_string()),
            404 => StoreError::NotFound(body.to_string()),
            408 => StoreError::Timeout,
            429 => StoreError::RateLimited,
            500..=599 => StoreError::Server(status, body.to_string()),
            _ => StoreError::Request(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() || err.is_request() {
            StoreError::Network(err.to_string())
        } else if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Request(err.to_string())
        }
    }
}

impl From<StoreError> for io::Error {
    fn from(err: StoreError) -> Self {
        io::Error::new(err.to_io_kind(), err)
    }
}
