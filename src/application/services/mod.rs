//! Application services - the long-running pipeline stages.
//!
//! - `persona_enricher` - turns one seed into a full persona
//! - `persona_generator` - enriches a whole panel with bounded concurrency
//! - `simulation_executor` - runs persona/feature pairs through the model

mod persona_enricher;
mod persona_generator;
mod simulation_executor;

pub use persona_enricher::{EnrichmentSettings, PersonaEnricher};
pub use persona_generator::PersonaGenerator;
pub use simulation_executor::{
    BatchControl, BatchOutcome, BatchProgress, ExecutorSettings, SimulationExecutor,
    SimulationPair,
};
