//! Artifactory connection configuration
//!
//! Loaded from environment variables, or from a JSON file in the platform
//! config directory. Environment wins when `ARTIFACTORY_URL` is set.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::vfs::RepoPath;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for retryable errors
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Credentials sent with every request
#[derive(Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Credentials {
    /// No authentication (anonymous read access)
    #[default]
    Anonymous,
    /// HTTP Basic with username and password (or API key)
    Basic { username: String, password: String },
    /// Bearer access token
    Token { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => f.write_str("Anonymous"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Server, repository and credentials for one Artifactory repository
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactoryConfig {
    /// Base server URL, e.g. `https://example.jfrog.io/artifactory`
    pub server_url: String,
    /// Repository key
    pub repository: String,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no configuration: set ARTIFACTORY_URL or create {0}")]
    NotConfigured(PathBuf),
}

impl ArtifactoryConfig {
    /// Create a configuration with default timeout and retries
    pub fn new(server_url: &str, repository: &str, credentials: Credentials) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            repository: repository.trim_matches('/').to_string(),
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ARTIFACTORY_URL` (required)
    /// - `ARTIFACTORY_REPOSITORY` (required)
    /// - `ARTIFACTORY_TOKEN`, or `ARTIFACTORY_USERNAME` + `ARTIFACTORY_PASSWORD`
    /// - `ARTIFACTORY_TIMEOUT_SECS` (default: 30)
    /// - `ARTIFACTORY_MAX_RETRIES` (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url =
            lookup("ARTIFACTORY_URL").ok_or(ConfigError::MissingVar("ARTIFACTORY_URL"))?;
        let repository = lookup("ARTIFACTORY_REPOSITORY")
            .ok_or(ConfigError::MissingVar("ARTIFACTORY_REPOSITORY"))?;

        let credentials = match (
            lookup("ARTIFACTORY_TOKEN"),
            lookup("ARTIFACTORY_USERNAME"),
            lookup("ARTIFACTORY_PASSWORD"),
        ) {
            (Some(token), _, _) => Credentials::Token { token },
            (None, Some(username), Some(password)) => Credentials::Basic { username, password },
            (None, Some(_), None) => return Err(ConfigError::MissingVar("ARTIFACTORY_PASSWORD")),
            _ => Credentials::Anonymous,
        };

        let mut config = Self::new(&server_url, &repository, credentials);
        if let Some(raw) = lookup("ARTIFACTORY_TIMEOUT_SECS") {
            config.timeout_secs = parse_number("ARTIFACTORY_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("ARTIFACTORY_MAX_RETRIES") {
            config.max_retries = parse_number("ARTIFACTORY_MAX_RETRIES", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.server_url = config.server_url.trim_end_matches('/').to_string();
        config.repository = config.repository.trim_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Default config file location: `<config dir>/artifactory-vfs/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("artifactory-vfs")
            .join("config.json")
    }

    /// Environment when `ARTIFACTORY_URL` is set, else the default config file
    pub fn load() -> Result<Self, ConfigError> {
        if std::env::var_os("ARTIFACTORY_URL").is_some() {
            return Self::from_env();
        }
        let path = Self::default_path();
        if !path.exists() {
            return Err(ConfigError::NotConfigured(path));
        }
        Self::from_file(&path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.server_url)
            .map_err(|e| ConfigError::InvalidUrl(self.server_url.clone(), e.to_string()))?;
        if self.repository.is_empty() {
            return Err(ConfigError::InvalidValue(
                "repository".to_string(),
                "must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Download URL of an artifact: `{server}/{repository}/{path}`
    pub fn artifact_url(&self, path: &RepoPath) -> String {
        join_url(&format!("{}/{}", self.server_url, self.repository), path)
    }

    /// Storage API URL of an item: `{server}/api/storage/{repository}/{path}`
    pub fn storage_url(&self, path: &RepoPath) -> String {
        join_url(
            &format!("{}/api/storage/{}", self.server_url, self.repository),
            path,
        )
    }
}

/// Append `path` to `base`, percent-encoding each segment
fn join_url(base: &str, path: &RepoPath) -> String {
    let mut url = base.to_string();
    for segment in path.segments() {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw.to_string()))
}
