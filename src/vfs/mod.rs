//! Path-addressable view of a remote repository

pub mod context;
pub mod errors;
pub mod path;
pub mod virtual_path;

pub use context::ArtifactContext;
pub use errors::VfsError;
pub use path::RepoPath;
pub use virtual_path::VirtualPath;
