//! Invocation context shared by every path of one run

use std::fmt;
use std::sync::Arc;

use crate::artifactory::ArtifactoryClient;
use crate::config::ArtifactoryConfig;
use crate::remote::{RemoteStore, StoreError};

use super::VirtualPath;

/// Configuration plus the remote store it resolves to
pub struct ArtifactContext {
    config: ArtifactoryConfig,
    store: Arc<dyn RemoteStore>,
}

impl ArtifactContext {
    /// Wrap an existing store
    pub fn new(config: ArtifactoryConfig, store: Arc<dyn RemoteStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }

    /// Build an HTTP client for `config`
    pub fn connect(config: ArtifactoryConfig) -> Result<Arc<Self>, StoreError> {
        let client = ArtifactoryClient::new(config.clone())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &ArtifactoryConfig {
        &self.config
    }

    /// Repository identity used to key cache frames
    pub fn repository(&self) -> &str {
        &self.config.repository
    }

    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }

    /// Path object for `key` in this context
    pub fn path(self: &Arc<Self>, key: &str) -> VirtualPath {
        VirtualPath::new(key, Arc::clone(self))
    }
}

impl fmt::Debug for ArtifactContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
