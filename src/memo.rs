//! Memoization Module
//!
//! Wraps an operation so repeated calls with the same derived key are served
//! from a cache instead of re-invoking the operation.

use std::time::Duration;

use crate::cache::{Clock, MemoryCache, SystemClock};

// == Memoized ==
/// An operation paired with a key-derivation function and a cache.
///
/// [`call`] derives a key from the arguments, consults the cache, and only
/// invokes the underlying operation on a miss, storing the result under the
/// derived key. The cache is injected at construction, so its lifetime and
/// namespace stay caller-controlled; nothing here is process-global.
///
/// [`call`]: Memoized::call
#[derive(Debug)]
pub struct Memoized<F, K, V, C: Clock = SystemClock> {
    cache: MemoryCache<V, C>,
    key_fn: K,
    op: F,
    /// TTL for cached results; the cache's default when None
    ttl: Option<Duration>,
}

impl<F, K, V, C: Clock> Memoized<F, K, V, C> {
    // == Constructor ==
    /// Wraps `op` with caching through `cache`, keyed by `key_fn`.
    pub fn new(cache: MemoryCache<V, C>, key_fn: K, op: F) -> Self {
        Self {
            cache,
            key_fn,
            op,
            ttl: None,
        }
    }

    /// Sets the TTL applied to cached results.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    // == Call ==
    /// Invokes the wrapped operation, consulting the cache first.
    pub fn call<A>(&mut self, args: &A) -> V
    where
        F: FnMut(&A) -> V,
        K: Fn(&A) -> String,
        V: Clone,
    {
        let key = (self.key_fn)(args);
        if let Some(value) = self.cache.get(&key) {
            return value;
        }

        let value = (self.op)(args);
        self.cache.set(key, value.clone(), self.ttl);
        value
    }

    // == Cache Access ==
    /// Read access to the underlying cache, e.g. for stats.
    pub fn cache(&self) -> &MemoryCache<V, C> {
        &self.cache
    }

    /// Hands the underlying cache back to the caller.
    pub fn into_cache(self) -> MemoryCache<V, C> {
        self.cache
    }
}

/// Convenience constructor for [`Memoized`] over the system clock.
pub fn memoize<F, K, V>(cache: MemoryCache<V>, key_fn: K, op: F) -> Memoized<F, K, V> {
    Memoized::new(cache, key_fn, op)
}
