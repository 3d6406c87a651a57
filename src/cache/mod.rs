//! Cache Module
//!
//! Provides in-process caching with TTL expiration and bounded-capacity
//! eviction, in a memory-resident and a storage-backed variant.

use std::time::Duration;

mod clock;
mod entry;
mod memory;
mod order;
mod persistent;
mod stats;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use order::InsertionTracker;
pub use persistent::PersistentCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Default maximum number of entries for the in-memory cache
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// TTL applied when the caller omits one
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Fraction of capacity evicted when cleanup runs at capacity
pub const DEFAULT_EVICT_FRACTION: f64 = 0.2;

/// Namespace key the persistent cache uses when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "app_cache";
