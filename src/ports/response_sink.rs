//! Response Sink Port - Incremental delivery of simulated chunks.
//!
//! Large batches hand each finished chunk to a sink as soon as it completes,
//! so callers can persist or stream results without waiting for the whole
//! batch.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::simulation::SimulationResponse;

/// One finished chunk of a batch.
#[derive(Debug, Clone, Copy)]
pub struct ChunkProgress {
    /// Zero-based chunk index.
    pub chunk_index: usize,
    /// Pairs finished so far across all chunks, this one included.
    pub completed: usize,
    /// Pairs in the whole batch.
    pub total: usize,
}

/// Receives the successful responses of each finished chunk.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Accept the responses of one chunk.
    ///
    /// # Errors
    ///
    /// A sink error does not abort the batch; the executor logs it and
    /// reports the chunk index in the batch outcome.
    async fn accept(
        &self,
        progress: ChunkProgress,
        responses: &[SimulationResponse],
    ) -> Result<(), DomainError>;
}
