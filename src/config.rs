//! Configuration Module
//!
//! Policy constants for the cache, loadable from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{
    DEFAULT_EVICT_FRACTION, DEFAULT_MAX_ENTRIES, DEFAULT_STORAGE_KEY, DEFAULT_TTL,
};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Degenerate values (zero capacity, zero TTL, fractions outside
/// (0, 1]) are not validated; the cache is a best-effort layer and treats
/// them as caller error with unspecified behavior.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the in-memory cache can hold
    pub max_entries: usize,
    /// TTL applied to entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Fraction of capacity evicted when cleanup runs at capacity
    pub evict_fraction: f64,
    /// Namespace key the persistent cache stores its blob under
    pub storage_key: String,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum entries (default: 100)
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 1800)
    /// - `CACHE_EVICT_FRACTION` - Eviction batch fraction (default: 0.2)
    /// - `CACHE_STORAGE_KEY` - Persistent namespace key (default: "app_cache")
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            default_ttl: env::var("CACHE_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
            evict_fraction: env::var("CACHE_EVICT_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EVICT_FRACTION),
            storage_key: env::var("CACHE_STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL,
            evict_fraction: DEFAULT_EVICT_FRACTION,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}
