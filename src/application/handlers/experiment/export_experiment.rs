//! ExportExperimentHandler - Query handler producing formatter-ready output.
//!
//! The core only guarantees the structures; rendering them as CSV or
//! anything else is left to the caller.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};
use crate::domain::insights::{AggregatedInsights, ExportRow, EXPORT_HEADERS};
use crate::ports::ExperimentRepository;

/// Query for an experiment's export.
#[derive(Debug, Clone)]
pub struct ExportExperimentQuery {
    pub experiment_id: ExperimentId,
}

/// Insights plus one row per persona response.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentExport {
    pub experiment_id: ExperimentId,
    pub feature_name: String,
    pub partial_coverage: bool,
    pub insights: AggregatedInsights,
    pub headers: [&'static str; 9],
    pub rows: Vec<ExportRow>,
}

#[derive(Debug, Error)]
pub enum ExportExperimentError {
    #[error("experiment not found: {0}")]
    NotFound(ExperimentId),

    #[error("experiment {0} has not been simulated")]
    NotSimulated(ExperimentId),

    #[error(transparent)]
    Domain(DomainError),
}

/// Handler for exporting experiment results.
pub struct ExportExperimentHandler {
    repository: Arc<dyn ExperimentRepository>,
}

impl ExportExperimentHandler {
    pub fn new(repository: Arc<dyn ExperimentRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ExportExperimentQuery,
    ) -> Result<ExperimentExport, ExportExperimentError> {
        let experiment = self
            .repository
            .get(&query.experiment_id)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ExperimentNotFound => {
                    ExportExperimentError::NotFound(query.experiment_id)
                }
                _ => ExportExperimentError::Domain(e),
            })?;

        let insights = experiment
            .insights()
            .cloned()
            .ok_or(ExportExperimentError::NotSimulated(query.experiment_id))?;

        Ok(ExperimentExport {
            experiment_id: experiment.id(),
            feature_name: experiment.feature().name.clone(),
            partial_coverage: experiment.partial_coverage(),
            insights,
            headers: EXPORT_HEADERS,
            rows: experiment.export_rows(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::cache::InMemoryResultCache;
    use crate::adapters::storage::InMemoryExperimentRepository;
    use crate::application::handlers::experiment::test_support::stored_experiment;
    use crate::application::handlers::experiment::{RunSimulationCommand, RunSimulationHandler};
    use crate::application::services::{ExecutorSettings, SimulationExecutor};
    use crate::domain::insights::Aggregator;

    #[tokio::test]
    async fn exports_one_populated_row_per_persona() {
        let repository = Arc::new(InMemoryExperimentRepository::new());
        let experiment = stored_experiment(repository.clone()).await;
        let executor = SimulationExecutor::new(
            Arc::new(MockAIProvider::offline()),
            Arc::new(InMemoryResultCache::new()),
            ExecutorSettings::default(),
        );
        RunSimulationHandler::new(Arc::new(executor), repository.clone(), Aggregator::default())
            .handle(RunSimulationCommand::new(experiment.id()))
            .await
            .unwrap();

        let export = ExportExperimentHandler::new(repository)
            .handle(ExportExperimentQuery {
                experiment_id: experiment.id(),
            })
            .await
            .unwrap();

        assert_eq!(export.rows.len(), 5);
        assert_eq!(export.headers, EXPORT_HEADERS);
        assert_eq!(export.insights.total_responses, 5);
        for row in &export.rows {
            assert!(row.values().iter().all(|v| !v.is_empty()));
        }
    }

    #[tokio::test]
    async fn unsimulated_experiment_cannot_be_exported() {
        let repository = Arc::new(InMemoryExperimentRepository::new());
        let experiment = stored_experiment(repository.clone()).await;

        let err = ExportExperimentHandler::new(repository)
            .handle(ExportExperimentQuery {
                experiment_id: experiment.id(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ExportExperimentError::NotSimulated(_)));
    }
}
