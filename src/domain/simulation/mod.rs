//! Simulation module - prompts, model-output parsing, and responses.

mod parser;
mod prompt;
mod response;

pub use parser::ParsedResponse;
pub use prompt::{PromptBuilder, RESPONSE_LABELS};
pub use response::{
    Decision, FailureReason, PartialFailureReport, SimulationFailure, SimulationResponse,
    PARSING_FAILED, SIMULATION_FAILED,
};
