//! Persistent Cache Module
//!
//! Storage-backed variant of the cache. The whole namespace lives as one
//! serialized blob in a host-supplied byte-string store; every operation is a
//! read-modify-write of that blob.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, Clock, SystemClock, DEFAULT_STORAGE_KEY, DEFAULT_TTL};
use crate::config::CacheConfig;
use crate::error::StorageError;
use crate::storage::StorageBackend;

// == Loaded Entries ==
/// Namespace snapshot tagged with its provenance.
///
/// `from_store` is false when the blob was unreadable (store failure or
/// malformed data) and the mapping degraded to empty. The public contract is
/// unchanged either way; the tag exists so the write path can observe that it
/// is rebuilding a namespace it could not read.
#[derive(Debug)]
struct LoadedEntries<V> {
    entries: HashMap<String, CacheEntry<V>>,
    from_store: bool,
}

// == Persistent Cache ==
/// Cache persisted as a single blob under a namespace key.
///
/// Same caller contract as [`MemoryCache`] minus capacity enforcement: there
/// is no bulk cleanup, only lazy per-key expiration on the `get`/`has`/
/// `delete` paths. Storage failures never propagate; every operation degrades
/// to treating the namespace as empty and logs a warning. The cache is
/// best-effort: callers must be able to re-fetch the authoritative source.
///
/// Independent instances sharing one namespace key race on read-modify-write;
/// that mirrors the host store's sharing model and is an accepted limitation.
///
/// [`MemoryCache`]: crate::cache::MemoryCache
#[derive(Debug)]
pub struct PersistentCache<V, S: StorageBackend, C: Clock = SystemClock> {
    /// The host-supplied store
    store: S,
    /// Namespace key the blob is stored under
    storage_key: String,
    /// TTL for entries stored without an explicit TTL
    default_ttl: Duration,
    /// Time source
    clock: C,
    _value: PhantomData<fn() -> V>,
}

impl<V, S> PersistentCache<V, S>
where
    V: Clone + Serialize + DeserializeOwned,
    S: StorageBackend,
{
    // == Constructor ==
    /// Creates a cache over `store` using the default namespace key.
    pub fn new(store: S) -> Self {
        Self::with_storage_key(store, DEFAULT_STORAGE_KEY)
    }

    /// Creates a cache over `store` namespaced by `storage_key`.
    pub fn with_storage_key(store: S, storage_key: impl Into<String>) -> Self {
        Self::with_clock(store, storage_key, DEFAULT_TTL, SystemClock)
    }

    /// Creates a cache from configuration.
    pub fn from_config(store: S, config: &CacheConfig) -> Self {
        Self::with_clock(
            store,
            config.storage_key.clone(),
            config.default_ttl,
            SystemClock,
        )
    }
}

impl<V, S, C> PersistentCache<V, S, C>
where
    V: Clone + Serialize + DeserializeOwned,
    S: StorageBackend,
    C: Clock,
{
    /// Creates a cache reading time from the supplied clock.
    pub fn with_clock(
        store: S,
        storage_key: impl Into<String>,
        default_ttl: Duration,
        clock: C,
    ) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            default_ttl,
            clock,
            _value: PhantomData,
        }
    }

    /// The namespace key this cache stores its blob under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL and persists the namespace.
    ///
    /// Best-effort: a failed store write drops the mutation silently.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let mut loaded = self.load();
        if !loaded.from_store {
            debug!(
                namespace = %self.storage_key,
                "rebuilding unreadable cache namespace from empty"
            );
        }

        let entry = CacheEntry::new(
            value,
            self.clock.now_ms(),
            ttl.unwrap_or(self.default_ttl),
        );
        loaded.entries.insert(key.into(), entry);
        self.persist(&loaded.entries);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An expired entry is removed from the blob and the shrunk namespace
    /// persisted back, matching the in-memory cache's lazy expiration.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut loaded = self.load();

        if let Some(entry) = loaded.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }

            loaded.entries.remove(key);
            self.persist(&loaded.entries);
        }

        None
    }

    // == Has ==
    /// Checks whether a live entry exists for `key`.
    ///
    /// Same liveness check and lazy reclamation as [`get`].
    ///
    /// [`get`]: PersistentCache::get
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let mut loaded = self.load();

        if let Some(entry) = loaded.entries.get(key) {
            if entry.is_live(now) {
                return true;
            }

            loaded.entries.remove(key);
            self.persist(&loaded.entries);
        }

        false
    }

    // == Delete ==
    /// Removes the entry for `key` and persists the namespace.
    ///
    /// Returns true only when a live entry was removed; an expired entry is
    /// purged from the blob but reported as absent, consistent with `get`.
    pub fn delete(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let mut loaded = self.load();

        match loaded.entries.remove(key) {
            Some(entry) => {
                self.persist(&loaded.entries);
                entry.is_live(now)
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes the whole namespace from the store.
    pub fn clear(&mut self) {
        if let Err(err) = self.store.remove(&self.storage_key) {
            warn!(
                namespace = %self.storage_key,
                error = %err,
                "failed to clear cache namespace"
            );
        }
    }

    // == Load ==
    /// Deserializes the namespace blob, failing soft to an empty mapping.
    fn load(&self) -> LoadedEntries<V> {
        match self.try_load() {
            Ok(entries) => LoadedEntries {
                entries: entries.unwrap_or_default(),
                from_store: true,
            },
            Err(err) => {
                warn!(
                    namespace = %self.storage_key,
                    error = %err,
                    "cache namespace unreadable, treating as empty"
                );
                LoadedEntries {
                    entries: HashMap::new(),
                    from_store: false,
                }
            }
        }
    }

    fn try_load(&self) -> Result<Option<HashMap<String, CacheEntry<V>>>, StorageError> {
        match self.store.get(&self.storage_key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    // == Persist ==
    /// Serializes the namespace and writes it back, dropping the write on
    /// failure.
    fn persist(&mut self, entries: &HashMap<String, CacheEntry<V>>) {
        if let Err(err) = self.try_persist(entries) {
            warn!(
                namespace = %self.storage_key,
                error = %err,
                "cache write dropped"
            );
        }
    }

    fn try_persist(
        &mut self,
        entries: &HashMap<String, CacheEntry<V>>,
    ) -> Result<(), StorageError> {
        let blob = serde_json::to_string(entries)?;
        self.store.set(&self.storage_key, blob)
    }
}
