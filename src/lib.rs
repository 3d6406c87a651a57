//! Crop Cache - in-process caching for the crop catalog
//!
//! Provides a bounded in-memory TTL cache, a storage-backed variant sharing
//! the same contract, and a memoization wrapper over either.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod storage;

pub use cache::{
    CacheEntry, CacheStats, Clock, ManualClock, MemoryCache, PersistentCache, SystemClock,
};
pub use config::CacheConfig;
pub use error::StorageError;
pub use memo::{memoize, Memoized};
pub use storage::{MemoryStore, StorageBackend};
