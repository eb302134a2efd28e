//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the persona simulation domain.

mod errors;
mod ids;
mod simulation_status;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ExperimentId, PersonaId};
pub use simulation_status::SimulationStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
