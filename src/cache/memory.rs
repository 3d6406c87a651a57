//! Memory Cache Module
//!
//! In-memory cache engine combining HashMap storage with insertion-order
//! eviction and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{
    CacheEntry, CacheStats, Clock, InsertionTracker, SystemClock, DEFAULT_EVICT_FRACTION,
};
use crate::config::CacheConfig;

// == Memory Cache ==
/// Bounded in-memory cache with per-entry TTL.
///
/// Expiration is lazy: entries past their TTL are treated as absent and
/// reclaimed on access or during [`cleanup`]. The capacity bound is restored
/// synchronously inside every [`set`], so `len() <= max_entries` holds between
/// calls. Eviction removes the oldest-inserted entries first (insertion time,
/// not last access).
///
/// The cache assumes a single logical owner; wrap it in a lock to share it
/// across threads, keeping each whole operation one critical section.
///
/// [`set`]: MemoryCache::set
/// [`cleanup`]: MemoryCache::cleanup
#[derive(Debug)]
pub struct MemoryCache<V, C: Clock = SystemClock> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion-order tracker backing eviction
    order: InsertionTracker,
    /// Performance counters
    stats: CacheStats,
    /// Maximum number of entries allowed after any `set` completes
    max_entries: usize,
    /// TTL for entries stored without an explicit TTL
    default_ttl: Duration,
    /// Fraction of capacity evicted per cleanup at capacity
    evict_fraction: f64,
    /// Time source
    clock: C,
}

impl<V: Clone> MemoryCache<V> {
    // == Constructor ==
    /// Creates a new cache with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self::with_clock(max_entries, default_ttl, SystemClock)
    }

    /// Creates a new cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(config.max_entries, config.default_ttl);
        cache.evict_fraction = config.evict_fraction;
        cache
    }
}

impl<V: Clone, C: Clock> MemoryCache<V, C> {
    /// Creates a new cache reading time from the supplied clock.
    pub fn with_clock(max_entries: usize, default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            evict_fraction: DEFAULT_EVICT_FRACTION,
            clock,
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and its age resets.
    /// When the cache is at capacity the insert is preceded by [`cleanup`],
    /// which may evict unrelated entries. Always succeeds.
    ///
    /// [`cleanup`]: MemoryCache::cleanup
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        if self.entries.len() >= self.max_entries {
            self.cleanup();
        }

        let key = key.into();
        let entry = CacheEntry::new(
            value,
            self.clock.now_ms(),
            ttl.unwrap_or(self.default_ttl),
        );
        self.entries.insert(key.clone(), entry);
        self.order.touch(&key);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if present and within its TTL. An expired entry is
    /// removed on the spot and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }

            // Lazy expiration: reclaim on the read path
            self.entries.remove(key);
            self.order.remove(key);
        }

        self.stats.record_miss();
        None
    }

    // == Has ==
    /// Checks whether a live entry exists for `key`.
    ///
    /// Applies the same liveness check and lazy reclamation as [`get`], so the
    /// two always agree absent intervening mutation. Does not move the
    /// hit/miss counters; this is a presence probe, not a retrieval.
    ///
    /// [`get`]: MemoryCache::get
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return true;
            }

            self.entries.remove(key);
            self.order.remove(key);
        }

        false
    }

    // == Delete ==
    /// Removes the entry for `key` if one is physically present.
    ///
    /// Returns whether something was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Empties the cache without resetting its counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    // == Cleanup ==
    /// Two-phase reclamation; runs automatically when `set` finds the cache at
    /// capacity, or on demand.
    ///
    /// Phase 1 removes every entry past its TTL. Phase 2, if the cache is
    /// still at or above capacity, evicts the oldest-inserted survivors:
    /// `evict_fraction` of capacity rounded down, minimum one.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();

        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.order.remove(key);
        }

        let expired = expired_keys.len();
        let mut evicted = 0;

        if self.entries.len() >= self.max_entries {
            let batch = ((self.max_entries as f64 * self.evict_fraction) as usize).max(1);
            for _ in 0..batch {
                match self.order.pop_oldest() {
                    Some(key) => {
                        self.entries.remove(&key);
                        self.stats.record_eviction();
                        evicted += 1;
                    }
                    None => break,
                }
            }
        }

        if expired + evicted > 0 {
            debug!(expired, evicted, "cache cleanup");
        }

        expired + evicted
    }

    // == Stats ==
    /// Returns a snapshot of the cache's counters and entry liveness.
    ///
    /// Classification uses the same liveness check as `get` but removes
    /// nothing; this is a read-only diagnostic.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let valid = self
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count();

        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.valid_entries = valid;
        stats.expired_entries = self.entries.len() - valid;
        stats.max_entries = self.max_entries;
        stats
    }

    // == Length ==
    /// Returns the number of entries physically present, live or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const MINUTE: Duration = Duration::from_secs(60);

    fn test_cache() -> (MemoryCache<String, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        let cache = MemoryCache::with_clock(100, 30 * MINUTE, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_new() {
        let cache: MemoryCache<String> = MemoryCache::new(100, 30 * MINUTE);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let (mut cache, _clock) = test_cache();

        cache.set("key1", "value1".to_string(), None);

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let (mut cache, _clock) = test_cache();

        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite() {
        let (mut cache, _clock) = test_cache();

        cache.set("key1", "value1".to_string(), None);
        cache.set("key1", "value2".to_string(), None);

        assert_eq!(cache.get("key1"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reinsertion_refreshes_age() {
        let (mut cache, clock) = test_cache();

        cache.set("key1", "value1".to_string(), Some(30 * MINUTE));
        clock.advance(25 * MINUTE);

        // Overwrite resets created_at, so the entry survives past the
        // original deadline
        cache.set("key1", "value2".to_string(), Some(30 * MINUTE));
        clock.advance(10 * MINUTE);

        assert_eq!(cache.get("key1"), Some("value2".to_string()));
    }

    #[test]
    fn test_ttl_expiration() {
        let (mut cache, clock) = test_cache();

        cache.set("key1", "value1".to_string(), Some(MINUTE));

        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        clock.advance(MINUTE + Duration::from_millis(1));

        assert_eq!(cache.get("key1"), None);
        assert!(!cache.has("key1"));
    }

    #[test]
    fn test_expired_entry_reclaimed_on_get() {
        let (mut cache, clock) = test_cache();

        cache.set("key1", "value1".to_string(), Some(MINUTE));
        clock.advance(2 * MINUTE);

        assert_eq!(cache.get("key1"), None);
        // The read path physically removed the entry
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_expired_entry_reclaimed_on_has() {
        let (mut cache, clock) = test_cache();

        cache.set("key1", "value1".to_string(), Some(MINUTE));
        clock.advance(2 * MINUTE);

        assert!(!cache.has("key1"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_has_agrees_with_get() {
        let (mut cache, clock) = test_cache();

        cache.set("live", "v".to_string(), Some(10 * MINUTE));
        cache.set("dead", "v".to_string(), Some(MINUTE));
        clock.advance(5 * MINUTE);

        for key in ["live", "dead", "absent"] {
            let present = cache.has(key);
            assert_eq!(present, cache.get(key).is_some(), "disagreement on {key}");
        }
    }

    #[test]
    fn test_default_ttl_applied() {
        let clock = ManualClock::new(0);
        let mut cache: MemoryCache<String, ManualClock> =
            MemoryCache::with_clock(100, MINUTE, clock.clone());

        cache.set("key1", "value1".to_string(), None);

        clock.advance(Duration::from_secs(59));
        assert!(cache.has("key1"));

        clock.advance(Duration::from_secs(2));
        assert!(!cache.has("key1"));
    }

    #[test]
    fn test_delete() {
        let (mut cache, _clock) = test_cache();

        cache.set("key1", "value1".to_string(), None);

        assert!(cache.delete("key1"));
        assert_eq!(cache.get("key1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_nonexistent() {
        let (mut cache, _clock) = test_cache();
        assert!(!cache.delete("nonexistent"));
    }

    #[test]
    fn test_clear() {
        let (mut cache, _clock) = test_cache();

        cache.set("key1", "value1".to_string(), None);
        cache.set("key2", "value2".to_string(), None);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_capacity_bound_holds() {
        let clock = ManualClock::new(0);
        let mut cache: MemoryCache<String, ManualClock> =
            MemoryCache::with_clock(5, 30 * MINUTE, clock.clone());

        for i in 0..6 {
            cache.set(format!("k{i}"), format!("v{i}"), None);
            clock.advance(Duration::from_millis(1));
            assert!(cache.len() <= 5, "capacity exceeded at insert {i}");
        }

        assert!(cache.stats().total_entries <= 5);
        // The oldest insertion went first; the newest survived
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.get("k5"), Some("v5".to_string()));
    }

    #[test]
    fn test_eviction_removes_oldest_inserted() {
        let clock = ManualClock::new(0);
        let mut cache: MemoryCache<String, ManualClock> =
            MemoryCache::with_clock(5, 30 * MINUTE, clock.clone());

        for i in 0..5 {
            cache.set(format!("k{i}"), format!("v{i}"), None);
            clock.advance(Duration::from_millis(1));
        }

        // Reading k1 must not protect it: eviction is by insertion time
        assert!(cache.get("k1").is_some());

        cache.set("k5", "v5".to_string(), None);

        // floor(5 * 0.2) = 1 entry evicted, the oldest insertion
        assert_eq!(cache.get("k0"), None);
        assert!(cache.get("k1").is_some());
        assert!(cache.get("k4").is_some());
        assert!(cache.get("k5").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_same_timestamp_breaks_ties_by_insertion() {
        let clock = ManualClock::new(0);
        let mut cache: MemoryCache<String, ManualClock> =
            MemoryCache::with_clock(3, 30 * MINUTE, clock.clone());

        // All three inserts share one clock reading
        cache.set("first", "1".to_string(), None);
        cache.set("second", "2".to_string(), None);
        cache.set("third", "3".to_string(), None);

        cache.set("fourth", "4".to_string(), None);

        assert_eq!(cache.get("first"), None);
        assert!(cache.get("second").is_some());
        assert!(cache.get("third").is_some());
        assert!(cache.get("fourth").is_some());
    }

    #[test]
    fn test_cleanup_prefers_expired_over_eviction() {
        let clock = ManualClock::new(0);
        let mut cache: MemoryCache<String, ManualClock> =
            MemoryCache::with_clock(3, 30 * MINUTE, clock.clone());

        cache.set("short", "v".to_string(), Some(MINUTE));
        clock.advance(Duration::from_millis(1));
        cache.set("a", "v".to_string(), None);
        clock.advance(Duration::from_millis(1));
        cache.set("b", "v".to_string(), None);

        clock.advance(2 * MINUTE);

        // Phase 1 reclaims "short", leaving room without evicting live entries
        cache.set("c", "v".to_string(), None);

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_cleanup_batch_size() {
        let clock = ManualClock::new(0);
        let mut cache: MemoryCache<String, ManualClock> =
            MemoryCache::with_clock(10, 30 * MINUTE, clock.clone());

        for i in 0..10 {
            cache.set(format!("k{i}"), format!("v{i}"), None);
            clock.advance(Duration::from_millis(1));
        }

        // At capacity with nothing expired: floor(10 * 0.2) = 2 evictions
        let removed = cache.cleanup();

        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.get("k1"), None);
        assert!(cache.get("k2").is_some());
    }

    #[test]
    fn test_cleanup_below_capacity_only_reclaims_expired() {
        let (mut cache, clock) = test_cache();

        cache.set("short", "v".to_string(), Some(MINUTE));
        cache.set("long", "v".to_string(), Some(60 * MINUTE));

        clock.advance(2 * MINUTE);

        let removed = cache.cleanup();

        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.has("long"));
    }

    #[test]
    fn test_configured_evict_fraction() {
        let config = CacheConfig {
            max_entries: 4,
            evict_fraction: 0.5,
            ..CacheConfig::default()
        };
        let mut cache: MemoryCache<String> = MemoryCache::from_config(&config);

        for i in 0..4 {
            cache.set(format!("k{i}"), format!("v{i}"), None);
        }

        // floor(4 * 0.5) = 2 evictions per cleanup at capacity
        let removed = cache.cleanup();
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_stats_snapshot() {
        let (mut cache, clock) = test_cache();

        cache.set("live1", "v".to_string(), Some(10 * MINUTE));
        cache.set("live2", "v".to_string(), Some(10 * MINUTE));
        cache.set("dead", "v".to_string(), Some(MINUTE));

        clock.advance(5 * MINUTE);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.valid_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.max_entries, 100);
    }

    #[test]
    fn test_stats_does_not_mutate() {
        let (mut cache, clock) = test_cache();

        cache.set("dead", "v".to_string(), Some(MINUTE));
        clock.advance(2 * MINUTE);

        let first = cache.stats();
        let second = cache.stats();

        // The expired entry is classified, never reclaimed
        assert_eq!(first.expired_entries, 1);
        assert_eq!(second.expired_entries, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats_counters() {
        let (mut cache, _clock) = test_cache();

        cache.set("key1", "value1".to_string(), None);
        cache.get("key1");
        cache.get("nonexistent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
