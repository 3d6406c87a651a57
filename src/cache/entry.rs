//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// The payload is opaque to the cache. An entry is live while
/// `now - created_at <= ttl_ms`; past that point every read path treats it
/// as absent, whether or not it still occupies storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds); refreshed on re-insertion
    pub created_at: u64,
    /// Time-to-live in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the given creation time.
    pub fn new(value: V, created_at: u64, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    // == Is Live ==
    /// Checks whether the entry is still within its TTL at `now_ms`.
    ///
    /// Boundary condition: an entry whose age equals its TTL exactly is still
    /// live; it expires once the age strictly exceeds the TTL. Subtraction
    /// saturates so a wall clock stepping backwards never expires entries.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) <= self.ttl_ms
    }

    // == Remaining TTL ==
    /// Returns the remaining lifetime in milliseconds, `0` once expired.
    ///
    /// Diagnostic accessor; the cache itself only consults [`is_live`].
    ///
    /// [`is_live`]: CacheEntry::is_live
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        let age = now_ms.saturating_sub(self.created_at);
        self.ttl_ms.saturating_sub(age)
    }
}
