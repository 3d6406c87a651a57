//! Clock Module
//!
//! The cache's only time dependency. Entry timestamps come from an injected
//! [`Clock`] so tests can simulate long TTL windows without sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Clock Trait ==
/// Source of the current time in Unix milliseconds.
pub trait Clock {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

// == System Clock ==
/// Wall clock. The production time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }
}

// == Manual Clock ==
/// Manually advanced clock for deterministic tests.
///
/// Cloned handles share the same underlying time, so a test can keep a handle
/// while the cache owns another and advance both at once.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<Mutex<u64>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given timestamp.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        // Test utility: panic on a poisoned lock to fail tests early
        let mut now = self.now_ms.lock().expect("clock lock poisoned");
        *now += delta.as_millis() as u64;
    }

    /// Jumps the clock to an absolute timestamp.
    pub fn set(&self, now_ms: u64) {
        let mut now = self.now_ms.lock().expect("clock lock poisoned");
        *now = now_ms;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        *self.now_ms.lock().expect("clock lock poisoned")
    }
}
