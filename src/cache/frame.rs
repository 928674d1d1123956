//! Cache frames
//!
//! A frame is one populated snapshot of a subtree: metadata for every entry
//! under a root, keyed by the entry's path relative to that root. Frames are
//! filled once by the populator and only read afterwards.

use std::collections::{BTreeSet, HashMap};

use crate::remote::{FileInfo, StoreError};
use crate::vfs::path::immediate_child;
use crate::vfs::RepoPath;

/// Cached metadata for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedMetadata {
    pub size: u64,
    pub last_modified: i64,
    pub is_directory: bool,
}

impl CachedMetadata {
    /// Rebuild a full FileInfo for the entry at `path`
    pub fn to_file_info(self, path: RepoPath) -> FileInfo {
        FileInfo {
            path,
            size: self.size,
            last_modified: self.last_modified,
            is_directory: self.is_directory,
        }
    }
}

impl From<&FileInfo> for CachedMetadata {
    fn from(info: &FileInfo) -> Self {
        Self {
            size: info.size,
            last_modified: info.last_modified,
            is_directory: info.is_directory,
        }
    }
}

/// A folder whose listing failed while the frame was populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationFailure {
    /// Folder path relative to the frame root
    pub directory: String,
    /// Rendered store error
    pub error: String,
}

/// Metadata for a subtree, keyed by path relative to `root`
#[derive(Debug, Clone)]
pub struct CacheFrame {
    root: RepoPath,
    files: HashMap<String, CachedMetadata>,
    failures: Vec<PopulationFailure>,
}

impl CacheFrame {
    pub(crate) fn new(root: RepoPath) -> Self {
        Self {
            root,
            files: HashMap::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, relative: String, metadata: CachedMetadata) {
        self.files.insert(relative, metadata);
    }

    pub(crate) fn record_failure(&mut self, directory: &str, error: &StoreError) {
        self.failures.push(PopulationFailure {
            directory: directory.to_string(),
            error: error.to_string(),
        });
    }

    pub fn root(&self) -> &RepoPath {
        &self.root
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Path of `path` relative to this frame's root, if the frame covers it
    pub fn relative<'p>(&self, path: &'p RepoPath) -> Option<&'p str> {
        path.relative_to(&self.root)
    }

    /// Exact entry for a relative path
    pub fn get(&self, relative: &str) -> Option<&CachedMetadata> {
        self.files.get(relative)
    }

    /// Whether any cached entry lies strictly below `relative`
    pub fn has_descendants(&self, relative: &str) -> bool {
        self.files
            .keys()
            .any(|key| immediate_child(key, relative).is_some())
    }

    /// Distinct immediate child names below `relative`, sorted
    pub fn children<'a>(&'a self, relative: &str) -> BTreeSet<&'a str> {
        self.files
            .keys()
            .filter_map(|key| immediate_child(key, relative))
            .collect()
    }

    /// Folders whose listing failed during population
    pub fn failures(&self) -> &[PopulationFailure] {
        &self.failures
    }

    /// True when at least one listing failed, leaving gaps in the frame
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Whether the listing of the folder at `relative` failed
    pub fn listing_failed(&self, relative: &str) -> bool {
        self.failures.iter().any(|f| f.directory == relative)
    }

    /// Whether this frame can answer a listing of the folder at `relative`.
    ///
    /// Requires evidence that the folder exists (frame root, an exact folder
    /// entry, or cached descendants) and a successful listing of it.
    pub fn can_list(&self, relative: &str) -> bool {
        if self.listing_failed(relative) {
            return false;
        }
        relative.is_empty()
            || self.get(relative).is_some_and(|m| m.is_directory)
            || self.has_descendants(relative)
    }
}
