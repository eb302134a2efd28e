//! In-Memory Result Cache Adapter
//!
//! Keeps simulation responses in a shared map. Used in tests and for
//! single-process runs where persistence across restarts is not needed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::simulation::SimulationResponse;
use crate::ports::{CacheError, ResultCache};

/// In-memory cache of simulation responses
#[derive(Debug, Clone, Default)]
pub struct InMemoryResultCache {
    entries: Arc<RwLock<HashMap<String, SimulationResponse>>>,
}

impl InMemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all entries (useful for tests)
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, key: &str) -> Result<Option<SimulationResponse>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, response: &SimulationResponse) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.entries.read().await.len())
    }
}
