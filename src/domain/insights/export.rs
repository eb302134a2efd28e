//! Flat per-response rows for external formatters such as CSV writers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::PersonaId;
use crate::domain::persona::SyntheticPersona;
use crate::domain::simulation::{Decision, SimulationResponse};

/// Rendered for absent optional persona attributes.
pub const NOT_APPLICABLE: &str = "N/A";

/// Column headers matching [`ExportRow::values`].
pub const EXPORT_HEADERS: [&str; 9] = [
    "Persona Name",
    "Role",
    "Company Size",
    "Industry",
    "Age",
    "Decision",
    "Confidence",
    "Reasoning",
    "Key Factors",
];

/// One response joined with its persona; every field populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub persona_id: PersonaId,
    pub persona_name: String,
    pub role: String,
    pub company_size: String,
    pub industry: String,
    pub age: u8,
    pub decision: Decision,
    pub confidence: f64,
    pub reasoning: String,
    pub key_factors: Vec<String>,
}

impl ExportRow {
    /// Column values in [`EXPORT_HEADERS`] order.
    pub fn values(&self) -> [String; 9] {
        [
            self.persona_name.clone(),
            self.role.clone(),
            self.company_size.clone(),
            self.industry.clone(),
            self.age.to_string(),
            self.decision.to_string(),
            format!("{:.2}", self.confidence),
            self.reasoning.clone(),
            self.key_factors.join(", "),
        ]
    }
}

/// Joins responses with personas, in persona order.
///
/// Responses whose persona is not in `personas` are skipped.
pub fn export_rows(personas: &[SyntheticPersona], responses: &[SimulationResponse]) -> Vec<ExportRow> {
    let by_persona: HashMap<PersonaId, &SimulationResponse> =
        responses.iter().map(|r| (r.persona_id, r)).collect();

    personas
        .iter()
        .filter_map(|persona| {
            let response = by_persona.get(&persona.id)?;
            Some(ExportRow {
                persona_id: persona.id,
                persona_name: persona.name.clone(),
                role: persona.demographics.role.clone(),
                company_size: persona
                    .demographics
                    .company_size
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                industry: persona
                    .demographics
                    .industry
                    .clone()
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                age: persona.demographics.age,
                decision: response.decision,
                confidence: response.confidence,
                reasoning: response.reasoning.clone(),
                key_factors: response.key_factors.clone(),
            })
        })
        .collect()
}
