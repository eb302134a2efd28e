//! Result Cache Port - Memoized simulation responses keyed by prompt hash.
//!
//! The cache is an injected collaborator shared by every simulation run.
//! It is read-mostly and only written after a successful model call, so a
//! hit always returns the response exactly as first stored.

use async_trait::async_trait;

use crate::domain::simulation::SimulationResponse;

/// Errors from a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to serialize cached response: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize cached response: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for storing simulation responses by cache key.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Look up a response by its cache key.
    ///
    /// Returns `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<SimulationResponse>, CacheError>;

    /// Store a response under its cache key, replacing any previous entry.
    async fn put(&self, key: &str, response: &SimulationResponse) -> Result<(), CacheError>;

    /// Number of stored entries.
    async fn len(&self) -> Result<usize, CacheError>;

    async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }
}
