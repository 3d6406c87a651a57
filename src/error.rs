//! Error types for the storage boundary
//!
//! The cache API itself is infallible; these errors exist so storage backends
//! can report failures, which the persistent cache catches and logs.

use thiserror::Error;

// == Storage Error Enum ==
/// Failure modes of the durable byte-string store backing [`PersistentCache`].
///
/// None of these escape the cache API. The persistent cache catches every
/// variant, logs a warning, and degrades to treating the namespace as empty.
///
/// [`PersistentCache`]: crate::cache::PersistentCache
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store cannot be reached or is in an unusable state
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The namespace blob could not be encoded or decoded
    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store rejected a write for lack of space
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),
}
