//! ForkExperimentHandler - Command handler for testing a new feature on an
//! existing persona panel.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::experiment::Experiment;
use crate::domain::feature::FeatureDescription;
use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};
use crate::ports::ExperimentRepository;

/// Command to fork an experiment with a different feature.
#[derive(Debug, Clone)]
pub struct ForkExperimentCommand {
    pub experiment_id: ExperimentId,
    pub feature: FeatureDescription,
}

/// Result of a successful fork.
#[derive(Debug, Clone)]
pub struct ForkExperimentResult {
    /// The new experiment: same personas, new feature, no results.
    pub experiment: Experiment,
}

#[derive(Debug, Error)]
pub enum ForkExperimentError {
    #[error("experiment not found: {0}")]
    NotFound(ExperimentId),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for ForkExperimentError {
    fn from(err: DomainError) -> Self {
        ForkExperimentError::Domain(err)
    }
}

/// Handler for forking experiments.
pub struct ForkExperimentHandler {
    repository: Arc<dyn ExperimentRepository>,
}

impl ForkExperimentHandler {
    pub fn new(repository: Arc<dyn ExperimentRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: ForkExperimentCommand,
    ) -> Result<ForkExperimentResult, ForkExperimentError> {
        let source = self
            .repository
            .get(&cmd.experiment_id)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ExperimentNotFound => ForkExperimentError::NotFound(cmd.experiment_id),
                _ => ForkExperimentError::Domain(e),
            })?;

        let experiment = source.fork(cmd.feature)?;
        self.repository.create(&experiment).await?;

        info!(
            experiment_id = %experiment.id(),
            forked_from = %source.id(),
            "Experiment forked"
        );

        Ok(ForkExperimentResult { experiment })
    }
}
