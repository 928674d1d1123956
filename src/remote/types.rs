//! Entry metadata returned by a remote store

use crate::vfs::RepoPath;

/// Metadata for one entry in the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Full path within the repository
    pub path: RepoPath,
    /// Size in bytes (0 for folders)
    pub size: u64,
    /// Last modification time in milliseconds since epoch
    pub last_modified: i64,
    /// Whether this entry is a folder
    pub is_directory: bool,
}

impl FileInfo {
    pub fn file(path: impl Into<RepoPath>, size: u64, last_modified: i64) -> Self {
        Self {
            path: path.into(),
            size,
            last_modified,
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<RepoPath>, last_modified: i64) -> Self {
        Self {
            path: path.into(),
            size: 0,
            last_modified,
            is_directory: true,
        }
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// Base name (last component of the path)
    pub fn name(&self) -> &str {
        self.path.name()
    }
}
