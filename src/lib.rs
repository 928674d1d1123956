//! Artifactory VFS
//!
//! Presents an Artifactory repository as a tree of path objects, with a
//! scoped metadata cache so a whole subtree can be inspected for the price
//! of one listing per folder.

pub mod artifactory;
pub mod cache;
pub mod config;
pub mod remote;
pub mod vfs;

pub use artifactory::ArtifactoryClient;
pub use cache::ScopeStack;
pub use config::{ArtifactoryConfig, ConfigError, Credentials};
pub use remote::{FileInfo, RemoteStore, StoreError};
pub use vfs::{ArtifactContext, RepoPath, VfsError, VirtualPath};
