//! In-memory remote store that records every call, for tests

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FileInfo, RemoteStore, StoreError};
use crate::vfs::RepoPath;

#[derive(Default)]
pub(crate) struct FakeStore {
    entries: BTreeMap<RepoPath, FileInfo>,
    contents: HashMap<RepoPath, Vec<u8>>,
    failing: Mutex<HashSet<RepoPath>>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating any missing parent folders
    pub fn with_file(mut self, path: &str, size: u64, last_modified: i64) -> Self {
        let info = FileInfo::file(path, size, last_modified);
        self.add_parents(&info.path);
        self.entries.insert(info.path.clone(), info);
        self
    }

    /// Add a file with content; its size is the content length
    pub fn with_content(mut self, path: &str, content: &[u8]) -> Self {
        self = self.with_file(path, content.len() as u64, 1);
        self.contents.insert(RepoPath::new(path), content.to_vec());
        self
    }

    /// Add an (optionally empty) folder
    pub fn with_dir(mut self, path: &str) -> Self {
        let info = FileInfo::directory(path, 0);
        self.add_parents(&info.path);
        self.entries.insert(info.path.clone(), info);
        self
    }

    fn add_parents(&mut self, path: &RepoPath) {
        let mut parent = path.parent();
        while !parent.is_root() {
            self.entries
                .entry(parent.clone())
                .or_insert_with(|| FileInfo::directory(parent.clone(), 0));
            parent = parent.parent();
        }
    }

    /// Make every call touching `path` fail with a server error
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(RepoPath::new(path));
    }

    /// Undo [`FakeStore::fail`]
    pub fn recover(&self, path: &str) {
        self.failing.lock().unwrap().remove(&RepoPath::new(path));
    }

    /// Number of recorded calls for one operation
    pub fn calls(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == op)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Paths passed to `list`, in call order
    pub fn listed(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == "list")
            .map(|(_, path)| path.clone())
            .collect()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: &'static str, path: &RepoPath) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push((op, path.to_string()));
        if self.failing.lock().unwrap().contains(path) {
            return Err(StoreError::Server(500, format!("injected failure for {}", path)));
        }
        Ok(())
    }

    fn entry(&self, path: &RepoPath) -> Result<&FileInfo, StoreError> {
        self.entries
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list(&self, dir: &RepoPath) -> Result<Vec<FileInfo>, StoreError> {
        self.record("list", dir)?;
        if !dir.is_root() && !self.entry(dir)?.is_directory {
            return Err(StoreError::Request(format!("{} is not a folder", dir)));
        }
        Ok(self
            .entries
            .values()
            .filter(|info| info.path != *dir && info.path.parent() == *dir)
            .cloned()
            .collect())
    }

    async fn is_folder(&self, path: &RepoPath) -> Result<bool, StoreError> {
        self.record("is_folder", path)?;
        Ok(path.is_root() || self.entries.get(path).is_some_and(|e| e.is_directory))
    }

    async fn is_file(&self, path: &RepoPath) -> Result<bool, StoreError> {
        self.record("is_file", path)?;
        Ok(self.entries.get(path).is_some_and(|e| !e.is_directory))
    }

    async fn size(&self, path: &RepoPath) -> Result<u64, StoreError> {
        self.record("size", path)?;
        Ok(self.entry(path)?.size)
    }

    async fn last_modified(&self, path: &RepoPath) -> Result<i64, StoreError> {
        self.record("last_modified", path)?;
        Ok(self.entry(path)?.last_modified)
    }

    async fn download(&self, path: &RepoPath) -> Result<Vec<u8>, StoreError> {
        self.record("download", path)?;
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}
