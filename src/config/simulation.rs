//! Simulation batch configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::services::ExecutorSettings;

/// Simulation executor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Model calls in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Pairs per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Attempts per pair, first call included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Backoff multiplier per retry
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: u32,

    /// Directory for the file-backed result cache; in-memory when unset
    pub cache_dir: Option<String>,
}

impl SimulationConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Executor settings, taking sampling parameters from the AI section.
    pub fn executor_settings(&self, temperature: f32, max_tokens: u32) -> ExecutorSettings {
        ExecutorSettings {
            max_concurrency: self.max_concurrency,
            chunk_size: self.chunk_size,
            max_attempts: self.max_attempts,
            backoff_base: self.backoff_base(),
            backoff_factor: self.backoff_factor,
            temperature,
            max_tokens,
        }
    }

    /// Validate simulation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrency == 0 {
            return Err(ValidationError::MustBePositive("simulation.max_concurrency"));
        }
        if self.chunk_size == 0 {
            return Err(ValidationError::MustBePositive("simulation.chunk_size"));
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::MustBePositive("simulation.max_attempts"));
        }
        if self.backoff_factor == 0 {
            return Err(ValidationError::MustBePositive("simulation.backoff_factor"));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            chunk_size: default_chunk_size(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_factor: default_backoff_factor(),
            cache_dir: None,
        }
    }
}

fn default_max_concurrency() -> usize {
    5
}

fn default_chunk_size() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_factor() -> u32 {
    2
}
