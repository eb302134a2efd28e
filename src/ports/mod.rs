//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Language-model completions with transient/permanent errors
//! - `ResultCache` - Simulation responses keyed by prompt hash
//! - `ExperimentRepository` - Opaque experiment storage
//! - `ResponseSink` - Per-chunk delivery of simulated responses

mod ai_provider;
mod experiment_repository;
mod response_sink;
mod result_cache;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderErrorKind, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use experiment_repository::ExperimentRepository;
pub use response_sink::{ChunkProgress, ResponseSink};
pub use result_cache::{CacheError, ResultCache};
