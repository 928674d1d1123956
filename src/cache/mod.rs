//! Scoped metadata caching layer
//!
//! One recursive population per scope entry; every query inside the scope
//! is then answered from memory where the cache covers it.
//! Nothing is cached across scopes and file contents are never cached.

pub mod frame;
pub mod populate;
pub mod scope;

pub use frame::{CacheFrame, CachedMetadata, PopulationFailure};
pub use populate::CachePopulator;
pub use scope::ScopeStack;
