//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod experiment;

pub use experiment::{
    // Commands
    CreateExperimentCommand, CreateExperimentError, CreateExperimentHandler,
    CreateExperimentResult, PersonaCountLimits,
    ForkExperimentCommand, ForkExperimentError, ForkExperimentHandler, ForkExperimentResult,
    RunSimulationCommand, RunSimulationError, RunSimulationHandler, RunSimulationResult,
    ShareAction, ShareExperimentCommand, ShareExperimentError, ShareExperimentHandler,
    ShareExperimentResult,
    // Queries
    ExperimentExport, ExportExperimentError, ExportExperimentHandler, ExportExperimentQuery,
    GetSharedExperimentError, GetSharedExperimentHandler, GetSharedExperimentQuery,
};
