//! Application layer - Services, Commands, Queries, and Handlers.
//!
//! Services run the long pipeline stages (persona generation, simulation
//! batches). Handlers orchestrate them against the experiment repository,
//! one command or query each.

pub mod handlers;
pub mod services;

pub use handlers::{
    CreateExperimentCommand, CreateExperimentHandler, ExportExperimentHandler,
    ExportExperimentQuery, ForkExperimentCommand, ForkExperimentHandler,
    GetSharedExperimentHandler, GetSharedExperimentQuery, PersonaCountLimits,
    RunSimulationCommand, RunSimulationHandler, ShareAction, ShareExperimentCommand,
    ShareExperimentHandler,
};
pub use services::{
    BatchControl, BatchOutcome, BatchProgress, EnrichmentSettings, ExecutorSettings,
    PersonaEnricher, PersonaGenerator, SimulationExecutor, SimulationPair,
};
