//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Language-model providers (mock, OpenAI)
//! - `cache` - Result caches (in-memory, file)
//! - `storage` - Experiment repositories (in-memory)

pub mod ai;
pub mod cache;
pub mod storage;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use cache::{FileResultCache, InMemoryResultCache};
pub use storage::InMemoryExperimentRepository;
