//! Scoped cache stacks
//!
//! A [`ScopeStack`] holds the cache frames visible to one logical call
//! chain, per repository, innermost last. It is passed explicitly down the
//! call chain rather than stored in thread-local state, so two concurrent
//! chains can never see each other's frames.
//!
//! Entering a scope never mutates the caller's stack. The callable receives
//! a derived stack with the new frame on top; when that value is dropped
//! (normal return, error, panic unwind or cancellation of the future) the
//! frame is gone with it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::frame::{CacheFrame, CachedMetadata};
use super::populate::CachePopulator;
use crate::remote::RemoteStore;
use crate::vfs::{RepoPath, VfsError};

/// Hit/miss counters shared by every stack derived from the same root stack
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Per-repository stacks of cache frames for one call chain
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    /// Frames by repository; a repository is present only while it has frames
    repositories: HashMap<String, Vec<Arc<CacheFrame>>>,
    stats: Arc<CacheStats>,
}

impl ScopeStack {
    /// Create an empty stack for a new call chain
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no repository has any frame
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Number of frames pushed for `repository`
    pub fn depth(&self, repository: &str) -> usize {
        self.repositories.get(repository).map_or(0, Vec::len)
    }

    /// Push a frame for `repository`
    pub fn push(&mut self, repository: &str, frame: Arc<CacheFrame>) {
        self.repositories
            .entry(repository.to_string())
            .or_default()
            .push(frame);
    }

    /// Pop the innermost frame for `repository`.
    ///
    /// The repository entry is removed once its last frame is popped.
    pub fn pop(&mut self, repository: &str) -> Option<Arc<CacheFrame>> {
        let stack = self.repositories.get_mut(repository)?;
        let frame = stack.pop();
        if stack.is_empty() {
            self.repositories.remove(repository);
        }
        frame
    }

    /// Frames for `repository`, innermost first
    pub fn frames<'a>(&'a self, repository: &str) -> impl Iterator<Item = &'a CacheFrame> + 'a {
        self.repositories
            .get(repository)
            .into_iter()
            .flat_map(|stack| stack.iter().rev().map(Arc::as_ref))
    }

    /// Populate a frame for `root` and run `f` with it on top of this stack.
    ///
    /// Population failures never fail the scope; they leave gaps that later
    /// queries fill with remote calls. The callable's error passes through
    /// when it is already a [`VfsError`], and is wrapped as an I/O failure
    /// otherwise.
    pub async fn run_scoped<T, E, F, Fut>(
        &self,
        store: &dyn RemoteStore,
        repository: &str,
        root: &RepoPath,
        f: F,
    ) -> Result<T, VfsError>
    where
        F: FnOnce(ScopeStack) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<VfsError>,
    {
        let frame = CachePopulator::new(store).populate(root).await;
        if frame.is_degraded() {
            warn!(
                repository = repository,
                root = %root,
                failures = frame.failures().len(),
                "Cache frame is incomplete; uncovered queries will go remote"
            );
        }

        let mut inner = self.clone();
        inner.push(repository, Arc::new(frame));
        info!(
            repository = repository,
            root = %root,
            depth = inner.depth(repository),
            "Entering cache scope"
        );

        let result = f(inner).await;

        debug!(repository = repository, root = %root, ok = result.is_ok(), "Leaving cache scope");
        self.log_metrics();
        result.map_err(Into::into)
    }

    /// Exact cached entry for `path`, innermost frame first
    pub fn lookup(&self, repository: &str, path: &RepoPath) -> Option<CachedMetadata> {
        let found = self.frames(repository).find_map(|frame| {
            let relative = frame.relative(path)?;
            frame.get(relative).copied()
        });
        self.record(found.is_some(), "entry", path);
        found
    }

    /// Classify `path` as folder (`Some(true)`) or file (`Some(false)`) from
    /// the frames, or `None` when no frame knows it.
    ///
    /// An exact entry answers with its own kind. Without one, cached
    /// descendants prove a folder. Absence is never taken as proof that the
    /// path does not exist.
    pub fn classify(&self, repository: &str, path: &RepoPath) -> Option<bool> {
        let found = self.frames(repository).find_map(|frame| {
            let relative = frame.relative(path)?;
            match frame.get(relative) {
                Some(metadata) => Some(metadata.is_directory),
                None if frame.has_descendants(relative) => Some(true),
                None => None,
            }
        });
        self.record(found.is_some(), "kind", path);
        found
    }

    /// Immediate children of the folder at `path`, with their cached metadata.
    ///
    /// Served by the innermost frame that can vouch for a complete listing
    /// of the folder.
    pub fn children(
        &self,
        repository: &str,
        path: &RepoPath,
    ) -> Option<Vec<(String, Option<CachedMetadata>)>> {
        let found = self.frames(repository).find_map(|frame| {
            let relative = frame.relative(path)?;
            if frame.get(relative).is_some_and(|m| !m.is_directory) {
                return Some(Vec::new());
            }
            if !frame.can_list(relative) {
                return None;
            }
            let children = frame
                .children(relative)
                .into_iter()
                .map(|name| {
                    let key = if relative.is_empty() {
                        name.to_string()
                    } else {
                        format!("{}/{}", relative, name)
                    };
                    (name.to_string(), frame.get(&key).copied())
                })
                .collect::<Vec<_>>();
            Some(children)
        });
        self.record(found.is_some(), "listing", path);
        found
    }

    fn record(&self, hit: bool, what: &str, path: &RepoPath) {
        if hit {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path, what = what, "Cache HIT");
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path, what = what, "Cache MISS");
        }
    }

    /// Get cache statistics
    ///
    /// Returns (hits, misses, hit_rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    /// Log current cache metrics
    pub fn log_metrics(&self) {
        let (hits, misses, hit_rate) = self.stats();
        let frames: usize = self.repositories.values().map(Vec::len).sum();

        debug!(
            hits = hits,
            misses = misses,
            hit_rate = format!("{:.1}%", hit_rate),
            frames = frames,
            "Cache metrics"
        );
    }
}
