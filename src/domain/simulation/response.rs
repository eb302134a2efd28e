//! Simulation responses, decisions, and per-persona failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{PersonaId, Timestamp, ValidationError};

/// Reasoning recorded when model output could not be parsed.
pub const PARSING_FAILED: &str = "parsing_failed";

/// Reasoning recorded for a persona whose simulation permanently failed.
pub const SIMULATION_FAILED: &str = "simulation_failed";

/// A persona's adoption decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Adopt,
    Reject,
    Unsure,
}

impl Decision {
    /// Returns true for decisions that count as objections.
    pub fn is_objection(&self) -> bool {
        matches!(self, Decision::Reject | Decision::Unsure)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Adopt => "ADOPT",
            Decision::Reject => "REJECT",
            Decision::Unsure => "UNSURE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Decision {
    type Err = ValidationError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADOPT" => Ok(Decision::Adopt),
            "REJECT" => Ok(Decision::Reject),
            "UNSURE" => Ok(Decision::Unsure),
            other => Err(ValidationError::invalid_format(
                "decision",
                format!("'{}' is not one of ADOPT, REJECT, UNSURE", other),
            )),
        }
    }
}

/// One persona's simulated reaction to a feature.
///
/// Never mutated once created. Cached responses are returned with their
/// original timestamp and model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub persona_id: PersonaId,
    pub decision: Decision,
    /// Always within [0.0, 1.0].
    pub confidence: f64,
    pub reasoning: String,
    pub key_factors: Vec<String>,
    pub timestamp: Timestamp,
    pub model_used: String,
}

impl SimulationResponse {
    /// Placeholder for a persona whose simulation permanently failed.
    pub fn failed_placeholder(persona_id: PersonaId, model_used: impl Into<String>) -> Self {
        Self {
            persona_id,
            decision: Decision::Unsure,
            confidence: 0.0,
            reasoning: SIMULATION_FAILED.to_string(),
            key_factors: Vec::new(),
            timestamp: Timestamp::now(),
            model_used: model_used.into(),
        }
    }

    pub fn is_parse_failure(&self) -> bool {
        self.reasoning == PARSING_FAILED
    }

    pub fn is_failure_placeholder(&self) -> bool {
        self.reasoning == SIMULATION_FAILED
    }

    /// Returns true when the reasoning is a marker rather than model text.
    pub fn is_marker(&self) -> bool {
        self.is_parse_failure() || self.is_failure_placeholder()
    }
}

/// Why a persona's simulation gave up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider rejected the request outright.
    ProviderPermanent { message: String },
    /// Transient errors persisted through every attempt.
    RetriesExhausted { message: String },
    /// The batch was cancelled before this persona was simulated.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ProviderPermanent { message } => {
                write!(f, "permanent provider error: {}", message)
            }
            FailureReason::RetriesExhausted { message } => {
                write!(f, "retries exhausted: {}", message)
            }
            FailureReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single persona's permanent simulation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationFailure {
    pub persona_id: PersonaId,
    pub reason: FailureReason,
    pub attempts: u32,
}

/// Personas whose simulation permanently failed, returned alongside successes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFailureReport {
    pub failures: Vec<SimulationFailure>,
}

impl PartialFailureReport {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn persona_ids(&self) -> Vec<PersonaId> {
        self.failures.iter().map(|f| f.persona_id).collect()
    }
}
