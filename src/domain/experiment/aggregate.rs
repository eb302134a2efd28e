//! Experiment aggregate - the root entity for one adoption study.
//!
//! An Experiment owns the company context, the persona panel, the feature
//! under evaluation, and the responses and insights derived from simulating
//! that feature. Forking reuses the panel for a different feature.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::company::CompanyContext;
use crate::domain::feature::FeatureDescription;
use crate::domain::foundation::{
    DomainError, ErrorCode, ExperimentId, PersonaId, SimulationStatus, StateMachine, Timestamp,
};
use crate::domain::insights::{export_rows, AggregatedInsights, ExportRow};
use crate::domain::persona::SyntheticPersona;
use crate::domain::simulation::{PartialFailureReport, SimulationResponse};

/// The Experiment aggregate root.
///
/// Invariant: `simulation_results` is either empty or holds exactly one
/// response per persona, in persona order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    id: ExperimentId,
    /// Experiment this one was forked from, if any.
    forked_from: Option<ExperimentId>,
    company_context: CompanyContext,
    personas: Vec<SyntheticPersona>,
    feature: FeatureDescription,
    simulation_results: Vec<SimulationResponse>,
    insights: Option<AggregatedInsights>,
    status: SimulationStatus,
    partial_coverage: bool,
    is_public: bool,
    share_token: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Experiment {
    /// Creates an experiment over a generated persona panel.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if the feature is incomplete, the panel is empty,
    /// or two personas share an id.
    pub fn new(
        company_context: CompanyContext,
        personas: Vec<SyntheticPersona>,
        feature: FeatureDescription,
    ) -> Result<Self, DomainError> {
        feature.validate()?;
        if personas.is_empty() {
            return Err(DomainError::validation(
                "personas",
                "An experiment needs at least one persona",
            ));
        }
        let unique: HashSet<PersonaId> = personas.iter().map(|p| p.id).collect();
        if unique.len() != personas.len() {
            return Err(DomainError::validation("personas", "Persona ids must be unique"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: ExperimentId::new(),
            forked_from: None,
            company_context,
            personas,
            feature,
            simulation_results: Vec::new(),
            insights: None,
            status: SimulationStatus::NotRun,
            partial_coverage: false,
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> ExperimentId {
        self.id
    }

    pub fn forked_from(&self) -> Option<ExperimentId> {
        self.forked_from
    }

    pub fn company_context(&self) -> &CompanyContext {
        &self.company_context
    }

    pub fn personas(&self) -> &[SyntheticPersona] {
        &self.personas
    }

    pub fn persona(&self, id: PersonaId) -> Option<&SyntheticPersona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub fn persona_ids(&self) -> Vec<PersonaId> {
        self.personas.iter().map(|p| p.id).collect()
    }

    pub fn feature(&self) -> &FeatureDescription {
        &self.feature
    }

    pub fn simulation_results(&self) -> &[SimulationResponse] {
        &self.simulation_results
    }

    pub fn insights(&self) -> Option<&AggregatedInsights> {
        self.insights.as_ref()
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    /// True when some personas only have failure placeholders.
    pub fn partial_coverage(&self) -> bool {
        self.partial_coverage
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn share_token(&self) -> Option<&str> {
        self.share_token.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn degraded_persona_count(&self) -> usize {
        self.personas.iter().filter(|p| p.degraded).count()
    }

    /// Recorded responses joined with their personas, for export.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        export_rows(&self.personas, &self.simulation_results)
    }

    // ───────────────────────────────────────────────────────────────
    // Forking
    // ───────────────────────────────────────────────────────────────

    /// Creates a new experiment with the same panel and a different feature.
    ///
    /// The fork keeps the company context and persona ids, starts with no
    /// results, and is private.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if the new feature is incomplete.
    pub fn fork(&self, feature: FeatureDescription) -> Result<Experiment, DomainError> {
        feature.validate()?;
        let now = Timestamp::now();
        Ok(Experiment {
            id: ExperimentId::new(),
            forked_from: Some(self.id),
            company_context: self.company_context.clone(),
            personas: self.personas.clone(),
            feature,
            simulation_results: Vec::new(),
            insights: None,
            status: SimulationStatus::NotRun,
            partial_coverage: false,
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Simulation lifecycle
    // ───────────────────────────────────────────────────────────────

    /// Moves to `Running`, dropping previous results and stale insights.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` if a run is in progress or awaiting insights.
    pub fn start_simulation(&mut self) -> Result<(), DomainError> {
        self.status = self.transition(SimulationStatus::Running)?;
        self.simulation_results.clear();
        self.insights = None;
        self.partial_coverage = false;
        self.touch();
        Ok(())
    }

    /// Resets a run that was interrupted before it recorded results, keeping
    /// the status at `Running`.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the simulation is running.
    pub fn restart_interrupted_simulation(&mut self) -> Result<(), DomainError> {
        if !self.status.is_running() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot restart a simulation that is {}", self.status),
            ));
        }
        self.simulation_results.clear();
        self.insights = None;
        self.partial_coverage = false;
        self.touch();
        Ok(())
    }

    /// Records a finished batch.
    ///
    /// Every persona must end up with exactly one response: either its own
    /// or, for personas listed in `failures`, a failure placeholder. When any
    /// failure is present the status moves to `PartialFailure`.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the simulation is running
    /// - `PersonaNotFound` for a response or failure about an unknown persona
    /// - `DuplicateResponse` for a second response for the same persona
    /// - `IncompleteResults` if a persona has neither response nor failure
    pub fn record_results(
        &mut self,
        responses: Vec<SimulationResponse>,
        failures: &PartialFailureReport,
        model_used: &str,
    ) -> Result<(), DomainError> {
        if !self.status.is_running() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot record results while {}", self.status),
            ));
        }

        let known: HashSet<PersonaId> = self.personas.iter().map(|p| p.id).collect();
        let mut by_persona: HashMap<PersonaId, SimulationResponse> = HashMap::new();
        for response in responses {
            if !known.contains(&response.persona_id) {
                return Err(persona_not_found(response.persona_id));
            }
            if by_persona.contains_key(&response.persona_id) {
                return Err(DomainError::new(
                    ErrorCode::DuplicateResponse,
                    "More than one response for a persona",
                )
                .with_detail("persona_id", response.persona_id.to_string()));
            }
            by_persona.insert(response.persona_id, response);
        }

        for failure in &failures.failures {
            if !known.contains(&failure.persona_id) {
                return Err(persona_not_found(failure.persona_id));
            }
            by_persona
                .entry(failure.persona_id)
                .or_insert_with(|| SimulationResponse::failed_placeholder(failure.persona_id, model_used));
        }

        let mut ordered = Vec::with_capacity(self.personas.len());
        for persona in &self.personas {
            match by_persona.remove(&persona.id) {
                Some(response) => ordered.push(response),
                None => {
                    return Err(DomainError::new(
                        ErrorCode::IncompleteResults,
                        "Every persona needs a response or a reported failure",
                    )
                    .with_detail("persona_id", persona.id.to_string()));
                }
            }
        }

        if !failures.is_empty() {
            self.status = self.transition(SimulationStatus::PartialFailure)?;
            self.partial_coverage = true;
        }
        self.simulation_results = ordered;
        self.touch();
        Ok(())
    }

    /// Attaches insights computed from the recorded results and completes
    /// the run.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless results were recorded for this run.
    pub fn attach_insights(&mut self, insights: AggregatedInsights) -> Result<(), DomainError> {
        if self.simulation_results.len() != self.personas.len() {
            return Err(DomainError::new(
                ErrorCode::IncompleteResults,
                "Insights require a complete response set",
            ));
        }
        self.status = self.transition(SimulationStatus::Completed)?;
        self.insights = Some(insights);
        self.touch();
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Sharing
    // ───────────────────────────────────────────────────────────────

    /// Makes the experiment public and returns its share token.
    ///
    /// Sharing an already shared experiment returns the existing token.
    pub fn share(&mut self) -> String {
        let token = match &self.share_token {
            Some(token) => token.clone(),
            None => Uuid::new_v4().simple().to_string(),
        };
        self.is_public = true;
        self.share_token = Some(token.clone());
        self.touch();
        token
    }

    /// Makes the experiment private and invalidates its share token.
    pub fn revoke_share(&mut self) {
        self.is_public = false;
        self.share_token = None;
        self.touch();
    }

    // ───────────────────────────────────────────────────────────────
    // Helpers
    // ───────────────────────────────────────────────────────────────

    fn transition(&self, target: SimulationStatus) -> Result<SimulationStatus, DomainError> {
        self.status
            .transition_to(target)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

fn persona_not_found(persona_id: PersonaId) -> DomainError {
    DomainError::new(ErrorCode::PersonaNotFound, "Persona is not part of this experiment")
        .with_detail("persona_id", persona_id.to_string())
}
