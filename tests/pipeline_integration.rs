//! Integration tests for the persona simulation pipeline.
//!
//! These tests drive the handlers end-to-end:
//! 1. CreateExperimentHandler builds the context and enriches a persona panel
//! 2. RunSimulationHandler simulates every persona and aggregates insights
//! 3. Fork, share and export work on the stored experiment
//!
//! Uses the mock provider and in-memory adapters, so no network is needed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use persona_sim::adapters::ai::{MockAIProvider, MockError, MockResponse};
use persona_sim::adapters::cache::{FileResultCache, InMemoryResultCache};
use persona_sim::adapters::storage::InMemoryExperimentRepository;
use persona_sim::application::handlers::RunSimulationResult;
use persona_sim::application::{
    BatchControl, BatchProgress, CreateExperimentCommand, CreateExperimentHandler,
    EnrichmentSettings, ExecutorSettings, ExportExperimentHandler, ExportExperimentQuery,
    ForkExperimentCommand, ForkExperimentHandler, GetSharedExperimentHandler,
    GetSharedExperimentQuery, PersonaCountLimits, PersonaEnricher, PersonaGenerator,
    RunSimulationCommand, RunSimulationHandler, ShareAction, ShareExperimentCommand,
    ShareExperimentHandler, SimulationExecutor,
};
use persona_sim::domain::company::{BusinessModel, CompanyInput, CompanySize};
use persona_sim::domain::experiment::Experiment;
use persona_sim::domain::feature::FeatureDescription;
use persona_sim::domain::foundation::{DomainError, SimulationStatus};
use persona_sim::domain::insights::Aggregator;
use persona_sim::domain::simulation::{Decision, FailureReason, SimulationResponse};
use persona_sim::ports::{ChunkProgress, ExperimentRepository, ResponseSink, ResultCache};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn company() -> CompanyInput {
    CompanyInput::new(
        "Flowline",
        "Software",
        BusinessModel::B2B,
        "B2B SaaS ops teams",
        CompanySize::Startup,
    )
}

fn feature() -> FeatureDescription {
    FeatureDescription::new(
        "AI workflow automation",
        "Automates repetitive operations work across the tools a team already uses",
        "Hours saved every week",
        "Operations managers",
    )
}

fn fast_settings() -> ExecutorSettings {
    ExecutorSettings {
        max_concurrency: 3,
        chunk_size: 2,
        backoff_base: Duration::from_millis(1),
        ..ExecutorSettings::default()
    }
}

struct Pipeline {
    repository: Arc<InMemoryExperimentRepository>,
    run: RunSimulationHandler,
}

impl Pipeline {
    fn new(provider: Arc<MockAIProvider>, cache: Arc<dyn ResultCache>) -> Self {
        Self::with_repository(provider, cache, Arc::new(InMemoryExperimentRepository::new()))
    }

    fn with_repository(
        provider: Arc<MockAIProvider>,
        cache: Arc<dyn ResultCache>,
        repository: Arc<InMemoryExperimentRepository>,
    ) -> Self {
        let executor = SimulationExecutor::new(provider, cache, fast_settings());
        Self {
            run: RunSimulationHandler::new(
                Arc::new(executor),
                repository.clone(),
                Aggregator::default(),
            ),
            repository,
        }
    }

    async fn create(&self, count: usize) -> Experiment {
        let enricher = Arc::new(PersonaEnricher::new(
            Arc::new(MockAIProvider::offline()),
            EnrichmentSettings::default(),
        ));
        CreateExperimentHandler::new(
            Arc::new(PersonaGenerator::new(enricher, 4)),
            self.repository.clone(),
            PersonaCountLimits::default(),
        )
        .handle(CreateExperimentCommand {
            company: company(),
            persona_count: Some(count),
            feature: feature(),
        })
        .await
        .unwrap()
        .experiment
    }

    async fn simulate(&self, experiment: &Experiment) -> RunSimulationResult {
        self.run
            .handle(RunSimulationCommand::new(experiment.id()))
            .await
            .unwrap()
    }
}

/// Records chunk progress and cancels after the first chunk.
struct CancellingSink {
    cancel: watch::Sender<bool>,
    delivered: AtomicUsize,
}

#[async_trait]
impl ResponseSink for CancellingSink {
    async fn accept(
        &self,
        _progress: ChunkProgress,
        responses: &[SimulationResponse],
    ) -> Result<(), DomainError> {
        self.delivered.fetch_add(responses.len(), Ordering::SeqCst);
        let _ = self.cancel.send(true);
        Ok(())
    }
}

// =============================================================================
// End-to-end
// =============================================================================

#[tokio::test]
async fn five_persona_panel_end_to_end() {
    let pipeline = Pipeline::new(
        Arc::new(MockAIProvider::offline()),
        Arc::new(InMemoryResultCache::new()),
    );
    let experiment = pipeline.create(5).await;

    // Personas are distinct on (age bracket, role) in at least 3 of 5 cases
    let mut pairs: HashMap<(String, String), usize> = HashMap::new();
    for persona in experiment.personas() {
        let key = (
            persona.demographics.age_bracket.to_string(),
            persona.demographics.role.clone(),
        );
        *pairs.entry(key).or_default() += 1;
    }
    let distinct = pairs.values().filter(|count| **count == 1).count();
    assert!(distinct >= 3, "only {distinct} distinct (age, role) pairs");

    let result = pipeline.simulate(&experiment).await;
    let experiment = result.experiment;

    assert_eq!(experiment.status(), SimulationStatus::Completed);
    assert_eq!(experiment.simulation_results().len(), 5);
    for response in experiment.simulation_results() {
        assert!((0.0..=1.0).contains(&response.confidence));
        assert!(experiment.persona(response.persona_id).is_some());
    }

    let adopters = experiment
        .simulation_results()
        .iter()
        .filter(|r| r.decision == Decision::Adopt)
        .count();
    let insights = experiment.insights().unwrap();
    assert!((insights.overall_adoption_rate - adopters as f64 / 5.0).abs() < 1e-9);
    assert!(insights.confidence_interval.0 <= insights.overall_adoption_rate);
    assert!(insights.confidence_interval.1 >= insights.overall_adoption_rate);
}

#[tokio::test]
async fn malformed_answer_is_unsure_and_others_complete() {
    let repository = Arc::new(InMemoryExperimentRepository::new());
    let creator = Pipeline::with_repository(
        Arc::new(MockAIProvider::offline()),
        Arc::new(InMemoryResultCache::new()),
        repository.clone(),
    );
    let experiment = creator.create(5).await;
    let odd_one = experiment.personas()[3].id;

    let provider = Arc::new(
        MockAIProvider::offline()
            .with_rule(odd_one.to_string(), MockResponse::text("DECISION: MAYBE")),
    );
    let pipeline = Pipeline::with_repository(
        provider,
        Arc::new(InMemoryResultCache::new()),
        repository,
    );
    let result = pipeline.simulate(&experiment).await;

    let responses = result.experiment.simulation_results();
    assert_eq!(responses.len(), 5);
    let malformed = responses.iter().find(|r| r.persona_id == odd_one).unwrap();
    assert_eq!(malformed.decision, Decision::Unsure);
    assert_eq!(malformed.confidence, 0.0);
    assert_eq!(malformed.reasoning, "parsing_failed");
    assert!(responses
        .iter()
        .filter(|r| r.persona_id != odd_one)
        .all(|r| r.reasoning != "parsing_failed"));
    assert!(result.failures.is_empty());
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn rerunning_an_unchanged_experiment_issues_no_calls() {
    let provider = Arc::new(MockAIProvider::offline());
    let pipeline = Pipeline::new(provider.clone(), Arc::new(InMemoryResultCache::new()));
    let experiment = pipeline.create(6).await;

    let first = pipeline.simulate(&experiment).await;
    let calls_after_first = provider.call_count();
    let second = pipeline.simulate(&experiment).await;

    assert_eq!(calls_after_first, 6);
    assert_eq!(provider.call_count(), 6);
    assert_eq!(second.cache_hits, 6);
    assert_eq!(
        first.experiment.simulation_results(),
        second.experiment.simulation_results()
    );
}

#[tokio::test]
async fn file_cache_survives_a_new_executor() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(InMemoryExperimentRepository::new());

    let first_provider = Arc::new(MockAIProvider::offline());
    let first = Pipeline::with_repository(
        first_provider.clone(),
        Arc::new(FileResultCache::new(dir.path())),
        repository.clone(),
    );
    let experiment = first.create(5).await;
    first.simulate(&experiment).await;
    assert_eq!(first_provider.call_count(), 5);

    let second_provider = Arc::new(MockAIProvider::offline());
    let second = Pipeline::with_repository(
        second_provider.clone(),
        Arc::new(FileResultCache::new(dir.path())),
        repository,
    );
    let result = second.simulate(&experiment).await;

    assert_eq!(second_provider.call_count(), 0);
    assert_eq!(result.cache_hits, 5);
}

// =============================================================================
// Forking
// =============================================================================

#[tokio::test]
async fn fork_preserves_personas_and_starts_empty() {
    let pipeline = Pipeline::new(
        Arc::new(MockAIProvider::offline()),
        Arc::new(InMemoryResultCache::new()),
    );
    let source = pipeline.create(5).await;
    pipeline.simulate(&source).await;

    let new_feature = FeatureDescription::new(
        "Slack approvals",
        "Approve workflow steps from chat",
        "Fewer context switches",
        "Team leads",
    );
    let fork = ForkExperimentHandler::new(pipeline.repository.clone())
        .handle(ForkExperimentCommand {
            experiment_id: source.id(),
            feature: new_feature,
        })
        .await
        .unwrap()
        .experiment;

    assert_eq!(fork.persona_ids(), source.persona_ids());
    assert!(fork.simulation_results().is_empty());
    assert!(fork.insights().is_none());

    let simulated = pipeline.simulate(&fork).await;
    assert_eq!(simulated.experiment.simulation_results().len(), 5);
    assert_eq!(simulated.cache_hits, 0);

    let source_after = pipeline.repository.get(&source.id()).await.unwrap();
    assert_eq!(source_after.feature().name, "AI workflow automation");
}

// =============================================================================
// Failures and cancellation
// =============================================================================

#[tokio::test]
async fn one_persona_failing_does_not_abort_the_batch() {
    let repository = Arc::new(InMemoryExperimentRepository::new());
    let creator = Pipeline::with_repository(
        Arc::new(MockAIProvider::offline()),
        Arc::new(InMemoryResultCache::new()),
        repository.clone(),
    );
    let experiment = creator.create(5).await;
    let failing = experiment.personas()[1].id;

    let provider = Arc::new(MockAIProvider::offline().with_rule(
        failing.to_string(),
        MockResponse::Error(MockError::RateLimited {
            retry_after_secs: 1,
        }),
    ));
    let pipeline = Pipeline::with_repository(
        provider.clone(),
        Arc::new(InMemoryResultCache::new()),
        repository,
    );
    let result = pipeline.simulate(&experiment).await;

    assert_eq!(result.failures.persona_ids(), vec![failing]);
    assert!(matches!(
        result.failures.failures[0].reason,
        FailureReason::RetriesExhausted { .. }
    ));
    assert_eq!(provider.calls_matching(&failing.to_string()), 3);
    assert!(result.experiment.partial_coverage());
    assert_eq!(result.experiment.status(), SimulationStatus::Completed);
    assert_eq!(result.experiment.simulation_results().len(), 5);
}

#[tokio::test]
async fn cancellation_stops_new_calls_and_keeps_finished_work() {
    let provider = Arc::new(MockAIProvider::offline());
    let pipeline = Pipeline::new(provider.clone(), Arc::new(InMemoryResultCache::new()));
    let experiment = pipeline.create(6).await;

    let (tx, rx) = watch::channel(false);
    let sink = Arc::new(CancellingSink {
        cancel: tx,
        delivered: AtomicUsize::new(0),
    });
    let progress = BatchProgress::new();
    let result = pipeline
        .run
        .handle(
            RunSimulationCommand::new(experiment.id()).with_control(
                BatchControl::new()
                    .with_cancellation(rx)
                    .with_sink(sink.clone())
                    .with_progress(progress.clone()),
            ),
        )
        .await
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(provider.call_count(), 2);
    assert_eq!(sink.delivered.load(Ordering::SeqCst), 2);
    assert_eq!(result.failures.len(), 4);
    assert_eq!(progress.completed(), 6);

    let stored = pipeline.repository.get(&experiment.id()).await.unwrap();
    assert_eq!(stored.simulation_results().len(), 6);
    assert!(stored.partial_coverage());
    let real = stored
        .simulation_results()
        .iter()
        .filter(|r| !r.is_failure_placeholder())
        .count();
    assert_eq!(real, 2);
}

// =============================================================================
// Sharing and export
// =============================================================================

#[tokio::test]
async fn shared_experiment_exports_complete_rows() {
    let pipeline = Pipeline::new(
        Arc::new(MockAIProvider::offline()),
        Arc::new(InMemoryResultCache::new()),
    );
    let experiment = pipeline.create(5).await;
    pipeline.simulate(&experiment).await;

    let token = ShareExperimentHandler::new(pipeline.repository.clone())
        .handle(ShareExperimentCommand {
            experiment_id: experiment.id(),
            action: ShareAction::Share,
        })
        .await
        .unwrap()
        .share_token
        .unwrap();

    let shared = GetSharedExperimentHandler::new(pipeline.repository.clone())
        .handle(GetSharedExperimentQuery { share_token: token })
        .await
        .unwrap();
    assert_eq!(shared.id(), experiment.id());

    let export = ExportExperimentHandler::new(pipeline.repository.clone())
        .handle(ExportExperimentQuery {
            experiment_id: experiment.id(),
        })
        .await
        .unwrap();
    assert_eq!(export.rows.len(), 5);
    assert!(!export.partial_coverage);
    for row in &export.rows {
        assert!(row.values().iter().all(|value| !value.is_empty()));
    }

    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(5));
}
