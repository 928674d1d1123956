//! Remote repository access
//!
//! The caching layer only ever talks to a remote repository through the
//! [`RemoteStore`] trait. Each method is a single round trip.

pub mod errors;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::vfs::RepoPath;

pub use errors::StoreError;
pub use types::FileInfo;

/// Immediate-children view of a remote repository.
///
/// `list` must return only direct children of `dir`, never a recursive
/// listing; the scoped cache is built on top of that granularity.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List the immediate children of a folder
    async fn list(&self, dir: &RepoPath) -> Result<Vec<FileInfo>, StoreError>;

    /// Whether `path` is an existing folder
    async fn is_folder(&self, path: &RepoPath) -> Result<bool, StoreError>;

    /// Whether `path` is an existing file
    async fn is_file(&self, path: &RepoPath) -> Result<bool, StoreError>;

    /// Size of the file at `path` in bytes
    async fn size(&self, path: &RepoPath) -> Result<u64, StoreError>;

    /// Last modification time of `path` in milliseconds since epoch
    async fn last_modified(&self, path: &RepoPath) -> Result<i64, StoreError>;

    /// Download the full content of the file at `path`
    async fn download(&self, path: &RepoPath) -> Result<Vec<u8>, StoreError>;
}
