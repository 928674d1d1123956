//! Cache population
//!
//! Walks a subtree depth-first with one immediate-children listing per
//! folder and records every entry relative to the walk's root.

use tracing::{debug, trace, warn};

use super::frame::{CacheFrame, CachedMetadata};
use crate::remote::RemoteStore;
use crate::vfs::RepoPath;

/// Builds a [`CacheFrame`] from a remote store
pub struct CachePopulator<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> CachePopulator<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    /// Populate a frame for the subtree at `root`.
    ///
    /// Issues exactly one `list` call per folder reachable under `root`
    /// (including `root`). A failed listing is logged and recorded on the
    /// frame; the walk carries on with the remaining folders, so the result
    /// may be partial but is always usable.
    pub async fn populate(&self, root: &RepoPath) -> CacheFrame {
        let mut frame = CacheFrame::new(root.clone());
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let relative_dir = dir.relative_to(root).unwrap_or_default().to_string();

            let children = match self.store.list(&dir).await {
                Ok(children) => children,
                Err(e) => {
                    warn!(root = %root, dir = %dir, error = %e, "Failed to list folder while populating cache");
                    frame.record_failure(&relative_dir, &e);
                    continue;
                }
            };
            trace!(dir = %dir, count = children.len(), "Listed folder");

            let mut subdirs = Vec::new();
            for child in children {
                // Only strict descendants of the listed folder make progress
                let under_dir = child
                    .path
                    .relative_to(&dir)
                    .is_some_and(|rel| !rel.is_empty());
                let relative = match child.path.relative_to(root) {
                    Some(rel) if under_dir => rel.to_string(),
                    _ => {
                        warn!(dir = %dir, child = %child.path, "Skipping entry outside listed folder");
                        continue;
                    }
                };

                frame.insert(relative, CachedMetadata::from(&child));
                if child.is_directory {
                    subdirs.push(child.path);
                }
            }
            // Reverse so folders are visited in listing order
            pending.extend(subdirs.into_iter().rev());
        }

        debug!(
            root = %root,
            entries = frame.len(),
            failures = frame.failures().len(),
            "Populated cache frame"
        );
        frame
    }
}
