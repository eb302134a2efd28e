//! RunSimulationHandler - Command handler for simulating an experiment.
//!
//! Runs every persona against the experiment's current feature, records one
//! response per persona (placeholders for permanent failures), aggregates
//! insights over the complete set, and stores the result.
//!
//! The experiment is stored as `Running` before the batch starts. Each run
//! claims its experiment for as long as the `handle` future lives, so a
//! stored `Running` status with no claim behind it belongs to a run that
//! errored or was dropped; the next run restarts it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

use crate::application::services::{BatchControl, SimulationExecutor, SimulationPair};
use crate::domain::experiment::Experiment;
use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};
use crate::domain::insights::Aggregator;
use crate::domain::simulation::PartialFailureReport;
use crate::ports::ExperimentRepository;

/// Command to simulate an experiment.
#[derive(Clone)]
pub struct RunSimulationCommand {
    pub experiment_id: ExperimentId,
    /// Cancellation, sink and progress for the batch. Responses are always
    /// retained here, since the experiment needs one per persona.
    pub control: BatchControl,
}

impl RunSimulationCommand {
    pub fn new(experiment_id: ExperimentId) -> Self {
        Self {
            experiment_id,
            control: BatchControl::new(),
        }
    }

    pub fn with_control(mut self, control: BatchControl) -> Self {
        self.control = control;
        self
    }
}

/// Result of a simulation run.
#[derive(Debug, Clone)]
pub struct RunSimulationResult {
    pub experiment: Experiment,
    /// Personas whose simulation failed or was cancelled.
    pub failures: PartialFailureReport,
    pub cache_hits: usize,
    pub model_calls: usize,
    pub cancelled: bool,
}

#[derive(Debug, Error)]
pub enum RunSimulationError {
    #[error("experiment not found: {0}")]
    NotFound(ExperimentId),

    #[error("simulation already in progress: {0}")]
    AlreadyRunning(ExperimentId),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for RunSimulationError {
    fn from(err: DomainError) -> Self {
        RunSimulationError::Domain(err)
    }
}

/// Experiments with a live run in this handler.
#[derive(Clone, Default)]
struct ActiveRuns(Arc<Mutex<HashSet<ExperimentId>>>);

impl ActiveRuns {
    fn claim(&self, experiment_id: ExperimentId) -> Option<ActiveRun> {
        let mut active = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        active.insert(experiment_id).then(|| ActiveRun {
            runs: self.clone(),
            experiment_id,
        })
    }
}

/// Released on drop, whether the run finished, failed, or was abandoned.
struct ActiveRun {
    runs: ActiveRuns,
    experiment_id: ExperimentId,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.runs
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.experiment_id);
    }
}

/// Handler for running simulations.
pub struct RunSimulationHandler {
    executor: Arc<SimulationExecutor>,
    repository: Arc<dyn ExperimentRepository>,
    aggregator: Aggregator,
    active: ActiveRuns,
}

impl RunSimulationHandler {
    pub fn new(
        executor: Arc<SimulationExecutor>,
        repository: Arc<dyn ExperimentRepository>,
        aggregator: Aggregator,
    ) -> Self {
        Self {
            executor,
            repository,
            aggregator,
            active: ActiveRuns::default(),
        }
    }

    pub async fn handle(
        &self,
        cmd: RunSimulationCommand,
    ) -> Result<RunSimulationResult, RunSimulationError> {
        // 1. Claim, load and mark running
        let _run = self
            .active
            .claim(cmd.experiment_id)
            .ok_or(RunSimulationError::AlreadyRunning(cmd.experiment_id))?;
        let mut experiment = self
            .repository
            .get(&cmd.experiment_id)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ExperimentNotFound => RunSimulationError::NotFound(cmd.experiment_id),
                _ => RunSimulationError::Domain(e),
            })?;
        if experiment.status().is_running() {
            warn!(
                experiment_id = %experiment.id(),
                "Restarting an interrupted simulation run"
            );
            experiment.restart_interrupted_simulation()?;
        } else {
            experiment.start_simulation()?;
        }
        self.repository.update(&experiment).await?;

        // 2. Simulate every persona
        let mut control = cmd.control.with_experiment(experiment.id());
        control.discard_responses = false;
        let outcome = {
            let pairs = SimulationPair::for_feature(experiment.personas(), experiment.feature());
            self.executor.execute(&pairs, &control).await
        };

        // 3. Record the full response set
        experiment.record_results(outcome.responses, &outcome.failures, &outcome.model)?;

        // 4. Aggregate over the complete set
        let insights = self
            .aggregator
            .aggregate(experiment.simulation_results(), experiment.personas());
        experiment.attach_insights(insights)?;

        // 5. Persist
        self.repository.update(&experiment).await?;

        info!(
            experiment_id = %experiment.id(),
            status = %experiment.status(),
            failures = outcome.failures.len(),
            cache_hits = outcome.cache_hits,
            model_calls = outcome.model_calls,
            cancelled = outcome.cancelled,
            "Simulation recorded"
        );

        Ok(RunSimulationResult {
            experiment,
            failures: outcome.failures,
            cache_hits: outcome.cache_hits,
            model_calls: outcome.model_calls,
            cancelled: outcome.cancelled,
        })
    }
}
