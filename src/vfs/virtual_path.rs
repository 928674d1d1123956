//! Path objects over a remote repository
//!
//! Every metadata query resolves in the same order: metadata already known
//! from a previous listing, then the cache frames of the caller's
//! [`ScopeStack`] (innermost first), then one direct call to the remote
//! store. Remote failures on metadata queries are logged and answered with a
//! safe default. Only [`VirtualPath::open`] reports failures to the caller.

use std::future::Future;
use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info, warn};

use super::context::ArtifactContext;
use super::errors::VfsError;
use super::path::RepoPath;
use crate::cache::ScopeStack;
use crate::remote::{FileInfo, RemoteStore};

/// A file or folder in the remote repository
#[derive(Debug, Clone)]
pub struct VirtualPath {
    key: RepoPath,
    context: Arc<ArtifactContext>,
    file_info: Option<FileInfo>,
}

impl VirtualPath {
    pub fn new(key: impl Into<RepoPath>, context: Arc<ArtifactContext>) -> Self {
        Self {
            key: key.into(),
            context,
            file_info: None,
        }
    }

    /// Path whose metadata is already known; queries on it cost nothing
    pub fn with_info(info: FileInfo, context: Arc<ArtifactContext>) -> Self {
        Self {
            key: info.path.clone(),
            context,
            file_info: Some(info),
        }
    }

    pub fn key(&self) -> &RepoPath {
        &self.key
    }

    pub fn file_info(&self) -> Option<&FileInfo> {
        self.file_info.as_ref()
    }

    pub fn context(&self) -> &Arc<ArtifactContext> {
        &self.context
    }

    fn repository(&self) -> &str {
        self.context.repository()
    }

    fn store(&self) -> &dyn RemoteStore {
        self.context.store()
    }

    /// File or folder name (last path segment)
    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn parent(&self) -> VirtualPath {
        VirtualPath::new(self.key.parent(), Arc::clone(&self.context))
    }

    pub fn child(&self, name: &str) -> VirtualPath {
        VirtualPath::new(self.key.child(name), Arc::clone(&self.context))
    }

    /// Artifact URL in the repository
    pub fn to_uri(&self) -> Result<Url, VfsError> {
        let url = self.context.config().artifact_url(&self.key);
        Url::parse(&url).map_err(|e| VfsError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }

    /// Browser-facing link to the artifact
    pub fn to_external_url(&self) -> Result<Url, VfsError> {
        self.to_uri()
    }

    pub fn can_read(&self) -> bool {
        true
    }

    pub async fn is_directory(&self, scope: &ScopeStack) -> bool {
        if let Some(info) = &self.file_info {
            return info.is_directory;
        }
        if self.key.is_view_marker() {
            return false;
        }
        if let Some(is_dir) = scope.classify(self.repository(), &self.key) {
            return is_dir;
        }
        match self.store().is_folder(&self.key).await {
            Ok(is_dir) => is_dir,
            Err(e) => {
                warn!(path = %self.key, error = %e, "Failed to check if path is a directory");
                false
            }
        }
    }

    pub async fn is_file(&self, scope: &ScopeStack) -> bool {
        if let Some(info) = &self.file_info {
            return info.is_file();
        }
        if self.key.is_view_marker() {
            return false;
        }
        if let Some(is_dir) = scope.classify(self.repository(), &self.key) {
            return !is_dir;
        }
        match self.store().is_file(&self.key).await {
            Ok(is_file) => is_file,
            Err(e) => {
                warn!(path = %self.key, error = %e, "Failed to check if path is a file");
                false
            }
        }
    }

    pub async fn exists(&self, scope: &ScopeStack) -> bool {
        self.is_directory(scope).await || self.is_file(scope).await
    }

    /// Size in bytes, 0 when unknown
    pub async fn length(&self, scope: &ScopeStack) -> u64 {
        if let Some(info) = &self.file_info {
            return info.size;
        }
        if let Some(metadata) = scope.lookup(self.repository(), &self.key) {
            return metadata.size;
        }
        match self.store().size(&self.key).await {
            Ok(size) => size,
            Err(e) => {
                warn!(path = %self.key, error = %e, "Failed to get size");
                0
            }
        }
    }

    /// Last modification time in epoch milliseconds, 0 when unknown
    pub async fn last_modified(&self, scope: &ScopeStack) -> i64 {
        if let Some(info) = &self.file_info {
            return info.last_modified;
        }
        if let Some(metadata) = scope.lookup(self.repository(), &self.key) {
            return metadata.last_modified;
        }
        match self.store().last_modified(&self.key).await {
            Ok(millis) => millis,
            Err(e) => {
                warn!(path = %self.key, error = %e, "Failed to get last modified time");
                0
            }
        }
    }

    /// Immediate children, empty when the folder cannot be listed
    pub async fn list(&self, scope: &ScopeStack) -> Vec<VirtualPath> {
        if let Some(children) = scope.children(self.repository(), &self.key) {
            return children
                .into_iter()
                .map(|(name, metadata)| {
                    let key = self.key.child(&name);
                    match metadata {
                        Some(metadata) => VirtualPath::with_info(
                            metadata.to_file_info(key),
                            Arc::clone(&self.context),
                        ),
                        None => VirtualPath::new(key, Arc::clone(&self.context)),
                    }
                })
                .collect();
        }

        match self.store().list(&self.key).await {
            Ok(children) => children
                .into_iter()
                .map(|info| VirtualPath::with_info(info, Arc::clone(&self.context)))
                .collect(),
            Err(e) => {
                warn!(path = %self.key, error = %e, "Failed to list folder");
                Vec::new()
            }
        }
    }

    /// Download the file content.
    ///
    /// Fails with [`VfsError::NotFound`] for folders and missing paths,
    /// before any download is attempted, and with [`VfsError::Io`] when the
    /// download itself fails.
    pub async fn open(&self, scope: &ScopeStack) -> Result<Vec<u8>, VfsError> {
        debug!(path = %self.key, "Opening artifact");
        if self.is_directory(scope).await {
            return Err(VfsError::NotFound(format!(
                "{}: cannot open because it is a directory",
                self.key
            )));
        }
        if !self.is_file(scope).await {
            return Err(VfsError::NotFound(format!(
                "{}: cannot open because it is not a file",
                self.key
            )));
        }

        let content = self.store().download(&self.key).await.map_err(|e| {
            warn!(path = %self.key, error = %e, "Failed to open artifact");
            VfsError::from(e)
        })?;
        info!(path = %self.key, size = content.len(), "Downloaded artifact");
        Ok(content)
    }

    /// Run `f` with the subtree under this path cached.
    ///
    /// The subtree is listed once up front; queries made through the scope
    /// handed to `f` are answered from that listing where it covers them.
    pub async fn run<T, E, F, Fut>(&self, scope: &ScopeStack, f: F) -> Result<T, VfsError>
    where
        F: FnOnce(ScopeStack) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<VfsError>,
    {
        scope
            .run_scoped(self.store(), self.repository(), &self.key, f)
            .await
    }
}
