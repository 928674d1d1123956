//! Artifactory storage API client
//!
//! Implements [`RemoteStore`] over the Artifactory REST API: one file-list
//! request per folder listing, item-info requests for single-path queries,
//! and plain artifact GETs for downloads.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use sha1::{Digest, Sha1};
use tracing::{debug, info, warn};

use super::types::{FileListResponse, StorageInfo};
use crate::config::{ArtifactoryConfig, Credentials};
use crate::remote::{FileInfo, RemoteStore, StoreError};
use crate::vfs::RepoPath;

/// Query string of the file list API, immediate children only
const LIST_QUERY: &str = "list&deep=0&listFolders=1&mdTimestamps=0";

/// Response header carrying the artifact's SHA-1
const SHA1_HEADER: &str = "X-Checksum-Sha1";

/// Delay before the first retry; doubled on each further attempt
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Artifactory client for one repository
#[derive(Clone)]
pub struct ArtifactoryClient {
    /// HTTP client for making requests
    http_client: Client,
    config: ArtifactoryConfig,
    /// Precomputed Authorization header, if any
    auth_header: Option<String>,
    backoff: Duration,
}

impl ArtifactoryClient {
    /// Create a client for the repository described by `config`
    pub fn new(config: ArtifactoryConfig) -> Result<Self, StoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let auth_header = auth_header(&config.credentials);

        debug!(
            server = %config.server_url,
            repository = %config.repository,
            "Artifactory client ready"
        );
        Ok(Self {
            http_client,
            config,
            auth_header,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Override the base retry delay
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn config(&self) -> &ArtifactoryConfig {
        &self.config
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.http_client.get(url);
        match &self.auth_header {
            Some(value) => request.header("Authorization", value),
            None => request,
        }
    }

    /// Execute an operation with retry logic and exponential backoff
    async fn with_retry<F, Fut, T>(&self, operation: &str, path: &RepoPath, f: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, StoreError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        operation = operation,
                        path = %path,
                        attempt = attempt,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying Artifactory request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        let response = self.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::from_status(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Item info for `path`, or `None` when it does not exist
    pub async fn storage_info(&self, path: &RepoPath) -> Result<Option<StorageInfo>, StoreError> {
        let url = self.config.storage_url(path);
        debug!(path = %path, "Fetching item info from Artifactory");

        match self
            .with_retry("info", path, || self.get_json::<StorageInfo>(&url))
            .await
        {
            Ok(info) => Ok(Some(info)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn require_info(&self, path: &RepoPath) -> Result<StorageInfo, StoreError> {
        self.storage_info(path)
            .await?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn fetch(&self, path: &RepoPath) -> Result<Vec<u8>, StoreError> {
        let url = self.config.artifact_url(path);
        debug!(path = %path, url = %url, "Downloading artifact");

        let response = self.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::from_status(status.as_u16(), &body));
        }

        let expected_sha1 = response
            .headers()
            .get(SHA1_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase);

        let bytes = response.bytes().await?;

        if let Some(expected) = expected_sha1 {
            let actual = format!("{:x}", Sha1::digest(&bytes));
            if actual != expected {
                return Err(StoreError::ChecksumMismatch {
                    path: path.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(bytes.to_vec())
    }
}

/// Authorization header value for `credentials`
fn auth_header(credentials: &Credentials) -> Option<String> {
    match credentials {
        Credentials::Anonymous => None,
        Credentials::Basic { username, password } => {
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", username, password));
            Some(format!("Basic {}", encoded))
        }
        Credentials::Token { token } => Some(format!("Bearer {}", token)),
    }
}

#[async_trait]
impl RemoteStore for ArtifactoryClient {
    async fn list(&self, dir: &RepoPath) -> Result<Vec<FileInfo>, StoreError> {
        let url = format!("{}?{}", self.config.storage_url(dir), LIST_QUERY);
        debug!(dir = %dir, "Listing folder from Artifactory");

        let response = self
            .with_retry("list", dir, || self.get_json::<FileListResponse>(&url))
            .await?;

        let children: Vec<FileInfo> = response
            .files
            .into_iter()
            .map(|entry| entry.into_file_info(dir))
            .filter(|info| info.path != *dir)
            .collect();

        debug!(dir = %dir, count = children.len(), "Listed folder from Artifactory");
        Ok(children)
    }

    async fn is_folder(&self, path: &RepoPath) -> Result<bool, StoreError> {
        Ok(self
            .storage_info(path)
            .await?
            .is_some_and(|info| info.is_folder()))
    }

    async fn is_file(&self, path: &RepoPath) -> Result<bool, StoreError> {
        Ok(self
            .storage_info(path)
            .await?
            .is_some_and(|info| info.is_file()))
    }

    async fn size(&self, path: &RepoPath) -> Result<u64, StoreError> {
        Ok(self.require_info(path).await?.size)
    }

    async fn last_modified(&self, path: &RepoPath) -> Result<i64, StoreError> {
        Ok(self.require_info(path).await?.last_modified_millis())
    }

    async fn download(&self, path: &RepoPath) -> Result<Vec<u8>, StoreError> {
        let content = self.with_retry("download", path, || self.fetch(path)).await?;
        info!(path = %path, size = content.len(), "Downloaded artifact from Artifactory");
        Ok(content)
    }
}
