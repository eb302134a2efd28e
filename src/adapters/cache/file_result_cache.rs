//! File-based Result Cache Adapter
//!
//! Stores each response as a JSON file named after its cache key, sharded
//! by the first two hex characters so no directory grows unbounded:
//!
//! ```text
//! <base>/ab/abcdef....json
//! ```
//!
//! Writes go to a temporary file first and are renamed into place, so a
//! reader never sees a half-written entry.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::simulation::SimulationResponse;
use crate::ports::{CacheError, ResultCache};

/// File-based cache of simulation responses
#[derive(Debug, Clone)]
pub struct FileResultCache {
    base_path: PathBuf,
}

impl FileResultCache {
    /// Create a cache rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let cache = FileResultCache::new("./data/cache");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn shard_dir(&self, key: &str) -> PathBuf {
        let shard: String = key.chars().take(2).collect();
        self.base_path.join(shard)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.shard_dir(key).join(format!("{}.json", key))
    }

    fn validate_key(key: &str) -> Result<(), CacheError> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CacheError::IoError(format!("Invalid cache key: {:?}", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl ResultCache for FileResultCache {
    async fn get(&self, key: &str) -> Result<Option<SimulationResponse>, CacheError> {
        Self::validate_key(key)?;
        let path = self.entry_path(key);

        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::IoError(e.to_string())),
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| CacheError::DeserializationFailed(e.to_string()))
    }

    async fn put(&self, key: &str, response: &SimulationResponse) -> Result<(), CacheError> {
        Self::validate_key(key)?;
        let dir = self.shard_dir(key);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        let json = serde_json::to_string_pretty(response)
            .map_err(|e| CacheError::SerializationFailed(e.to_string()))?;

        let tmp_path = dir.join(format!("{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, self.entry_path(key))
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let mut count = 0;
        let mut shards = match fs::read_dir(&self.base_path).await {
            Ok(shards) => shards,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(CacheError::IoError(e.to_string())),
        };

        while let Some(shard) = shards
            .next_entry()
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?
        {
            if !shard.path().is_dir() {
                continue;
            }
            let mut entries = fs::read_dir(shard.path())
                .await
                .map_err(|e| CacheError::IoError(e.to_string()))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| CacheError::IoError(e.to_string()))?
            {
                if entry.path().extension().is_some_and(|ext| ext == "json") {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}
