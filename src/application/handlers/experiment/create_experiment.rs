//! CreateExperimentHandler - Command handler for creating experiments.
//!
//! Builds the company context, generates the persona panel, and stores the
//! experiment with its first feature. Nothing is simulated yet.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::application::services::PersonaGenerator;
use crate::domain::company::{CompanyContext, CompanyInput, InsufficientContextError};
use crate::domain::experiment::Experiment;
use crate::domain::feature::FeatureDescription;
use crate::domain::foundation::{DomainError, ValidationError};
use crate::ports::ExperimentRepository;

/// Allowed persona panel sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaCountLimits {
    pub default_count: usize,
    pub min_count: usize,
    pub max_count: usize,
}

impl Default for PersonaCountLimits {
    fn default() -> Self {
        Self {
            default_count: 8,
            min_count: 5,
            max_count: 10,
        }
    }
}

/// Command to create a new experiment.
#[derive(Debug, Clone)]
pub struct CreateExperimentCommand {
    pub company: CompanyInput,
    /// Panel size; the configured default when `None`.
    pub persona_count: Option<usize>,
    pub feature: FeatureDescription,
}

/// Result of successful experiment creation.
#[derive(Debug, Clone)]
pub struct CreateExperimentResult {
    pub experiment: Experiment,
    /// Personas that had to be backfilled with defaults.
    pub degraded_personas: usize,
}

#[derive(Debug, Error)]
pub enum CreateExperimentError {
    #[error("invalid feature: {0}")]
    InvalidFeature(#[from] ValidationError),

    #[error("persona count {requested} is outside {min}..={max}")]
    PersonaCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error(transparent)]
    InsufficientContext(#[from] InsufficientContextError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Handler for creating experiments.
pub struct CreateExperimentHandler {
    generator: Arc<PersonaGenerator>,
    repository: Arc<dyn ExperimentRepository>,
    limits: PersonaCountLimits,
}

impl CreateExperimentHandler {
    pub fn new(
        generator: Arc<PersonaGenerator>,
        repository: Arc<dyn ExperimentRepository>,
        limits: PersonaCountLimits,
    ) -> Self {
        Self {
            generator,
            repository,
            limits,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateExperimentCommand,
    ) -> Result<CreateExperimentResult, CreateExperimentError> {
        // 1. Reject bad input before any model call
        cmd.feature.validate()?;
        let persona_count = cmd.persona_count.unwrap_or(self.limits.default_count);
        if !(self.limits.min_count..=self.limits.max_count).contains(&persona_count) {
            return Err(CreateExperimentError::PersonaCountOutOfRange {
                requested: persona_count,
                min: self.limits.min_count,
                max: self.limits.max_count,
            });
        }

        // 2. Derive the company context and persona seeds
        let context = CompanyContext::build(cmd.company, persona_count)?;

        // 3. Enrich seeds into personas
        let personas = self.generator.generate(&context).await;

        // 4. Create and persist the aggregate
        let experiment = Experiment::new(context, personas, cmd.feature)?;
        self.repository.create(&experiment).await?;

        let degraded_personas = experiment.degraded_persona_count();
        info!(
            experiment_id = %experiment.id(),
            personas = experiment.personas().len(),
            degraded_personas,
            "Experiment created"
        );

        Ok(CreateExperimentResult {
            experiment,
            degraded_personas,
        })
    }
}
