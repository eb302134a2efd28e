//! Experiment handlers - create, simulate, fork, share and export.

mod create_experiment;
mod export_experiment;
mod fork_experiment;
mod get_shared_experiment;
mod run_simulation;
mod share_experiment;

pub use create_experiment::{
    CreateExperimentCommand, CreateExperimentError, CreateExperimentHandler,
    CreateExperimentResult, PersonaCountLimits,
};
pub use export_experiment::{
    ExperimentExport, ExportExperimentError, ExportExperimentHandler, ExportExperimentQuery,
};
pub use fork_experiment::{
    ForkExperimentCommand, ForkExperimentError, ForkExperimentHandler, ForkExperimentResult,
};
pub use get_shared_experiment::{
    GetSharedExperimentError, GetSharedExperimentHandler, GetSharedExperimentQuery,
};
pub use run_simulation::{
    RunSimulationCommand, RunSimulationError, RunSimulationHandler, RunSimulationResult,
};
pub use share_experiment::{
    ShareAction, ShareExperimentCommand, ShareExperimentError, ShareExperimentHandler,
    ShareExperimentResult,
};
