//! JFrog Artifactory remote store

pub mod client;
pub mod types;

pub use client::ArtifactoryClient;
pub use types::{FileListEntry, FileListResponse, StorageInfo};
