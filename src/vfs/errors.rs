//! Caller-facing errors
//!
//! Only failures a caller must act on surface here: content that cannot be
//! found, and I/O failures while retrieving it. Metadata queries degrade to
//! defaults instead of failing.

use std::io;

use crate::remote::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl VfsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }
}

impl From<StoreError> for VfsError {
    fn from(err: StoreError) -> Self {
        VfsError::Io(err.into())
    }
}

impl From<anyhow::Error> for VfsError {
    fn from(err: anyhow::Error) -> Self {
        VfsError::Io(io::Error::other(err))
    }
}
