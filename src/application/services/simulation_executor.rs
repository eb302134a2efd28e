//! SimulationExecutor - runs (persona, feature) pairs through the model.
//!
//! Each pair renders its prompt, derives the cache key from it, and checks
//! the result cache before calling the model. Calls run concurrently up to
//! `max_concurrency`, in chunks of `chunk_size`; each finished chunk is
//! handed to an optional [`ResponseSink`] and counted in [`BatchProgress`].
//!
//! Failure handling:
//!
//! - transient provider errors are retried with exponential backoff
//! - permanent errors, and transient errors that outlast every attempt,
//!   become a [`SimulationFailure`] for that pair only
//! - unparseable model output becomes an UNSURE response, not a failure
//!
//! Cancellation is cooperative. Once the watch channel reads `true`, no new
//! model call is issued; calls already in flight finish and are kept, and
//! every pair that never started is reported as cancelled.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{watch, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::domain::feature::FeatureDescription;
use crate::domain::foundation::ExperimentId;
use crate::domain::persona::SyntheticPersona;
use crate::domain::simulation::{
    FailureReason, ParsedResponse, PartialFailureReport, PromptBuilder, SimulationFailure,
    SimulationResponse,
};
use crate::ports::{
    AIError, AIProvider, ChunkProgress, CompletionRequest, MessageRole, ProviderErrorKind,
    RequestMetadata, ResponseSink, ResultCache,
};

const SYSTEM_PROMPT: &str =
    "You are role-playing a specific persona evaluating a product feature. Stay in character.";

/// Tuning for a simulation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorSettings {
    /// Model calls in flight at once.
    pub max_concurrency: usize,
    /// Pairs per chunk.
    pub chunk_size: usize,
    /// Attempts per pair, the first call included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub backoff_base: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            chunk_size: 100,
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            backoff_factor: 2,
            temperature: 0.7,
            max_tokens: 300,
        }
    }
}

impl ExecutorSettings {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.max(1).saturating_pow(retry.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }
}

/// One persona evaluating one feature.
#[derive(Debug, Clone, Copy)]
pub struct SimulationPair<'a> {
    pub persona: &'a SyntheticPersona,
    pub feature: &'a FeatureDescription,
}

impl<'a> SimulationPair<'a> {
    /// Pairs every persona with the same feature.
    pub fn for_feature(
        personas: &'a [SyntheticPersona],
        feature: &'a FeatureDescription,
    ) -> Vec<SimulationPair<'a>> {
        personas
            .iter()
            .map(|persona| SimulationPair { persona, feature })
            .collect()
    }
}

/// Shared progress counter for a running batch.
#[derive(Debug, Clone, Default)]
pub struct BatchProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs finished so far, successes and failures alike.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Pairs in the batch; zero until the batch starts.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.total() > 0 && self.completed() >= self.total()
    }

    fn start(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    fn advance(&self, finished: usize) -> usize {
        self.completed.fetch_add(finished, Ordering::SeqCst) + finished
    }
}

/// Caller-side controls for one batch.
#[derive(Clone, Default)]
pub struct BatchControl {
    /// Experiment the batch belongs to, carried into request metadata.
    pub experiment_id: Option<ExperimentId>,
    /// Reads `true` once the caller wants the batch to stop.
    pub cancel: Option<watch::Receiver<bool>>,
    /// Receives each finished chunk's successful responses.
    pub sink: Option<Arc<dyn ResponseSink>>,
    pub progress: BatchProgress,
    /// When true, responses are only delivered to the sink, except for
    /// chunks the sink rejects.
    pub discard_responses: bool,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_experiment(mut self, experiment_id: ExperimentId) -> Self {
        self.experiment_id = Some(experiment_id);
        self
    }

    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResponseSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_progress(mut self, progress: BatchProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Stream-only mode for very large batches: responses go to the sink and
    /// are not kept in the outcome, unless the sink rejects their chunk.
    pub fn discarding_responses(mut self) -> Self {
        self.discard_responses = true;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }
}

/// Result of a batch: successes plus the partial-failure report.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One response per successful pair, in completion order.
    pub responses: Vec<SimulationResponse>,
    pub failures: PartialFailureReport,
    /// Pairs answered from the cache.
    pub cache_hits: usize,
    /// Model calls issued, retries included.
    pub model_calls: usize,
    /// Responses whose model output could not be parsed.
    pub parse_failures: usize,
    /// True if cancellation stopped the batch early.
    pub cancelled: bool,
    /// Indexes of chunks the sink rejected. In discarding mode their
    /// responses are kept in `responses` instead of being dropped.
    pub sink_failures: Vec<usize>,
    /// Model identifier used for new calls.
    pub model: String,
}

impl BatchOutcome {
    /// Pairs accounted for, successes and failures together.
    pub fn accounted(&self) -> usize {
        self.responses.len() + self.failures.len()
    }
}

enum PairResult {
    Cached(SimulationResponse),
    Simulated {
        response: SimulationResponse,
        calls: usize,
    },
    Failed {
        failure: SimulationFailure,
        calls: usize,
    },
}

/// Runs simulation batches against an AI provider with a shared cache.
pub struct SimulationExecutor {
    ai_provider: Arc<dyn AIProvider>,
    cache: Arc<dyn ResultCache>,
    settings: ExecutorSettings,
    locks: KeyLocks,
}

impl SimulationExecutor {
    pub fn new(
        ai_provider: Arc<dyn AIProvider>,
        cache: Arc<dyn ResultCache>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            ai_provider,
            cache,
            settings,
            locks: KeyLocks::default(),
        }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Model identifier reported by the provider.
    pub fn model(&self) -> String {
        self.ai_provider.provider_info().model
    }

    /// Simulates every pair and returns one entry per pair, either a
    /// response or a failure.
    pub async fn execute(&self, pairs: &[SimulationPair<'_>], control: &BatchControl) -> BatchOutcome {
        let total = pairs.len();
        let chunk_size = self.settings.chunk_size.max(1);
        let concurrency = self.settings.max_concurrency.max(1);
        control.progress.start(total);

        let mut outcome = BatchOutcome {
            model: self.model(),
            ..BatchOutcome::default()
        };
        let stopped = &AtomicBool::new(false);

        info!(
            experiment_id = ?control.experiment_id,
            pairs = total,
            chunk_size,
            concurrency,
            "Simulation batch started"
        );

        for (chunk_index, chunk) in pairs.chunks(chunk_size).enumerate() {
            if control.is_cancelled() {
                stopped.store(true, Ordering::SeqCst);
            }
            if stopped.load(Ordering::SeqCst) {
                let remaining = &pairs[chunk_index * chunk_size..];
                self.record_cancelled(remaining, &mut outcome);
                control.progress.advance(remaining.len());
                info!(
                    experiment_id = ?control.experiment_id,
                    skipped = remaining.len(),
                    "Simulation batch cancelled"
                );
                break;
            }

            let pair_futures: Vec<_> = chunk
                .iter()
                .map(|pair| self.simulate_pair(pair, control, stopped))
                .collect();
            let results: Vec<PairResult> = stream::iter(pair_futures)
                .buffer_unordered(concurrency)
                .collect()
                .await;

            let mut chunk_responses = Vec::with_capacity(chunk.len());
            for result in results {
                match result {
                    PairResult::Cached(response) => {
                        outcome.cache_hits += 1;
                        chunk_responses.push(response);
                    }
                    PairResult::Simulated { response, calls } => {
                        outcome.model_calls += calls;
                        if response.is_parse_failure() {
                            outcome.parse_failures += 1;
                        }
                        chunk_responses.push(response);
                    }
                    PairResult::Failed { failure, calls } => {
                        outcome.model_calls += calls;
                        outcome.failures.failures.push(failure);
                    }
                }
            }

            let completed = control.progress.advance(chunk.len());
            debug!(chunk_index, completed, total, "Simulation chunk finished");

            if let Some(sink) = &control.sink {
                let progress = ChunkProgress {
                    chunk_index,
                    completed,
                    total,
                };
                if let Err(e) = sink.accept(progress, &chunk_responses).await {
                    warn!(chunk_index, error = %e, "Response sink rejected chunk");
                    outcome.sink_failures.push(chunk_index);
                    if control.discard_responses {
                        outcome.responses.extend(chunk_responses);
                        continue;
                    }
                }
            }
            if !control.discard_responses {
                outcome.responses.extend(chunk_responses);
            }
        }

        outcome.cancelled = stopped.load(Ordering::SeqCst) || control.is_cancelled();
        info!(
            experiment_id = ?control.experiment_id,
            responses = outcome.responses.len(),
            failures = outcome.failures.len(),
            cache_hits = outcome.cache_hits,
            model_calls = outcome.model_calls,
            cancelled = outcome.cancelled,
            "Simulation batch finished"
        );
        outcome
    }

    async fn simulate_pair(
        &self,
        pair: &SimulationPair<'_>,
        control: &BatchControl,
        stopped: &AtomicBool,
    ) -> PairResult {
        let persona_id = pair.persona.id;
        let prompt = PromptBuilder::build(pair.persona, pair.feature);
        let cache_key = PromptBuilder::cache_key(&prompt);

        // Held until the response is cached, so concurrent callers with the
        // same key see the stored result instead of calling the model again.
        let _guard = self.locks.lock(&cache_key).await;

        match self.cache.get(&cache_key).await {
            Ok(Some(response)) => {
                debug!(persona_id = %persona_id, cache_key = %cache_key, "Cache hit");
                return PairResult::Cached(response);
            }
            Ok(None) => debug!(persona_id = %persona_id, cache_key = %cache_key, "Cache miss"),
            Err(e) => warn!(
                persona_id = %persona_id,
                cache_key = %cache_key,
                error = %e,
                "Cache lookup failed, simulating"
            ),
        }

        let mut calls = 0usize;
        let mut attempt = 0u32;
        loop {
            if stopped.load(Ordering::SeqCst) || control.is_cancelled() {
                stopped.store(true, Ordering::SeqCst);
                return PairResult::Failed {
                    failure: SimulationFailure {
                        persona_id,
                        reason: FailureReason::Cancelled,
                        attempts: attempt,
                    },
                    calls,
                };
            }

            attempt += 1;
            calls += 1;
            match self.call_model(&prompt, pair, control).await {
                Ok((content, model)) => {
                    let parsed = ParsedResponse::parse(&content);
                    if !parsed.is_parsed() {
                        warn!(persona_id = %persona_id, "Model output could not be parsed");
                    }
                    let response = parsed.into_response(persona_id, model);
                    if let Err(e) = self.cache.put(&cache_key, &response).await {
                        warn!(
                            persona_id = %persona_id,
                            cache_key = %cache_key,
                            error = %e,
                            "Failed to cache response"
                        );
                    }
                    return PairResult::Simulated { response, calls };
                }
                Err(e) => match e.kind() {
                    ProviderErrorKind::Transient if attempt < self.settings.max_attempts => {
                        let delay = self.settings.backoff_delay(attempt);
                        warn!(
                            persona_id = %persona_id,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Transient provider error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    kind => {
                        let reason = match kind {
                            ProviderErrorKind::Transient => FailureReason::RetriesExhausted {
                                message: e.to_string(),
                            },
                            ProviderErrorKind::Permanent => FailureReason::ProviderPermanent {
                                message: e.to_string(),
                            },
                        };
                        warn!(
                            persona_id = %persona_id,
                            attempts = attempt,
                            reason = %reason,
                            "Simulation failed"
                        );
                        return PairResult::Failed {
                            failure: SimulationFailure {
                                persona_id,
                                reason,
                                attempts: attempt,
                            },
                            calls,
                        };
                    }
                },
            }
        }
    }

    async fn call_model(
        &self,
        prompt: &str,
        pair: &SimulationPair<'_>,
        control: &BatchControl,
    ) -> Result<(String, String), AIError> {
        let mut metadata = RequestMetadata::new("simulation").with_persona(pair.persona.id);
        if let Some(experiment_id) = control.experiment_id {
            metadata = metadata.with_experiment(experiment_id);
        }
        let request = CompletionRequest::new(metadata)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let response = self.ai_provider.complete(request).await?;
        Ok((response.content, response.model))
    }

    fn record_cancelled(&self, pairs: &[SimulationPair<'_>], outcome: &mut BatchOutcome) {
        outcome
            .failures
            .failures
            .extend(pairs.iter().map(|pair| SimulationFailure {
                persona_id: pair.persona.id,
                reason: FailureReason::Cancelled,
                attempts: 0,
            }));
    }
}

/// One async mutex per cache key, dropped once nobody holds it.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, weak| weak.strong_count() > 0);
            match locks.get(key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(tokio::sync::Mutex::new(()));
                    locks.insert(key.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError, MockResponse};
    use crate::adapters::cache::InMemoryResultCache;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::persona::{fixtures, TechnologyAdoption};
    use crate::domain::simulation::Decision;
    use async_trait::async_trait;

    const ADOPT: &str =
        "DECISION: ADOPT\nCONFIDENCE: 0.8\nREASONING: Saves my team hours\nKEY_FACTORS: time savings, ease of use";

    fn settings() -> ExecutorSettings {
        ExecutorSettings {
            max_concurrency: 4,
            chunk_size: 2,
            max_attempts: 3,
            backoff_base: Duration::from_millis(1),
            backoff_factor: 2,
            ..ExecutorSettings::default()
        }
    }

    fn personas(n: usize) -> Vec<SyntheticPersona> {
        (0..n)
            .map(|i| {
                let mut p = fixtures::persona("Operations Manager", TechnologyAdoption::EarlyMajority);
                p.name = format!("Persona {}", i);
                p
            })
            .collect()
    }

    fn feature() -> FeatureDescription {
        FeatureDescription::new(
            "AI workflow automation",
            "Automates repetitive ops work",
            "Hours saved every week",
            "Ops managers",
        )
    }

    fn executor(provider: Arc<MockAIProvider>, cache: Arc<InMemoryResultCache>) -> SimulationExecutor {
        SimulationExecutor::new(provider, cache, settings())
    }

    #[tokio::test]
    async fn every_pair_gets_a_response() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let cache = Arc::new(InMemoryResultCache::new());
        let personas = personas(5);
        let feature = feature();

        let outcome = executor(provider.clone(), cache.clone())
            .execute(&SimulationPair::for_feature(&personas, &feature), &BatchControl::new())
            .await;

        assert_eq!(outcome.responses.len(), 5);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.model_calls, 5);
        assert_eq!(cache.len().await.unwrap(), 5);
        assert!(outcome.responses.iter().all(|r| r.decision == Decision::Adopt));
    }

    #[tokio::test]
    async fn second_run_is_served_from_cache() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let cache = Arc::new(InMemoryResultCache::new());
        let personas = personas(4);
        let feature = feature();
        let pairs = SimulationPair::for_feature(&personas, &feature);
        let executor = executor(provider.clone(), cache);

        let first = executor.execute(&pairs, &BatchControl::new()).await;
        let second = executor.execute(&pairs, &BatchControl::new()).await;

        assert_eq!(provider.call_count(), 4);
        assert_eq!(second.cache_hits, 4);
        assert_eq!(second.model_calls, 0);

        let mut a = first.responses.clone();
        let mut b = second.responses.clone();
        a.sort_by_key(|r| r.persona_id);
        b.sort_by_key(|r| r.persona_id);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn duplicate_pairs_call_the_model_once() {
        let provider = Arc::new(
            MockAIProvider::new()
                .with_default_response(ADOPT)
                .with_delay(Duration::from_millis(10)),
        );
        let cache = Arc::new(InMemoryResultCache::new());
        let personas = personas(1);
        let feature = feature();
        let pair = SimulationPair {
            persona: &personas[0],
            feature: &feature,
        };

        let outcome = executor(provider.clone(), cache)
            .execute(&[pair, pair, pair], &BatchControl::new())
            .await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(outcome.cache_hits, 2);
        assert_eq!(outcome.responses.len(), 3);
    }

    #[tokio::test]
    async fn malformed_output_becomes_unsure_without_blocking_others() {
        let personas = personas(5);
        let feature = feature();
        let provider = Arc::new(
            MockAIProvider::new()
                .with_rule(personas[2].id.to_string(), MockResponse::text("DECISION: MAYBE"))
                .with_default_response(ADOPT),
        );
        let outcome = executor(provider, Arc::new(InMemoryResultCache::new()))
            .execute(&SimulationPair::for_feature(&personas, &feature), &BatchControl::new())
            .await;

        assert_eq!(outcome.responses.len(), 5);
        assert_eq!(outcome.parse_failures, 1);
        let bad = outcome
            .responses
            .iter()
            .find(|r| r.persona_id == personas[2].id)
            .unwrap();
        assert_eq!(bad.decision, Decision::Unsure);
        assert_eq!(bad.confidence, 0.0);
        assert_eq!(bad.reasoning, "parsing_failed");
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let personas = personas(1);
        let feature = feature();
        let provider = Arc::new(
            MockAIProvider::new()
                .with_rule_times(
                    personas[0].id.to_string(),
                    MockResponse::Error(MockError::RateLimited { retry_after_secs: 1 }),
                    2,
                )
                .with_default_response(ADOPT),
        );
        let outcome = executor(provider.clone(), Arc::new(InMemoryResultCache::new()))
            .execute(&SimulationPair::for_feature(&personas, &feature), &BatchControl::new())
            .await;

        assert_eq!(provider.call_count(), 3);
        assert_eq!(outcome.responses.len(), 1);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn exhausted_retries_fail_only_that_persona() {
        let personas = personas(3);
        let feature = feature();
        let provider = Arc::new(
            MockAIProvider::new()
                .with_rule(
                    personas[1].id.to_string(),
                    MockResponse::Error(MockError::Timeout { timeout_secs: 30 }),
                )
                .with_default_response(ADOPT),
        );
        let cache = Arc::new(InMemoryResultCache::new());
        let outcome = executor(provider.clone(), cache.clone())
            .execute(&SimulationPair::for_feature(&personas, &feature), &BatchControl::new())
            .await;

        assert_eq!(outcome.responses.len(), 2);
        assert_eq!(outcome.failures.persona_ids(), vec![personas[1].id]);
        let failure = &outcome.failures.failures[0];
        assert_eq!(failure.attempts, 3);
        assert!(matches!(failure.reason, FailureReason::RetriesExhausted { .. }));
        assert_eq!(provider.calls_matching(&personas[1].id.to_string()), 3);
        assert_eq!(cache.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let personas = personas(1);
        let feature = feature();
        let provider =
            Arc::new(MockAIProvider::new().with_error(MockError::AuthenticationFailed));
        let outcome = executor(provider.clone(), Arc::new(InMemoryResultCache::new()))
            .execute(&SimulationPair::for_feature(&personas, &feature), &BatchControl::new())
            .await;

        assert_eq!(provider.call_count(), 1);
        assert!(matches!(
            outcome.failures.failures[0].reason,
            FailureReason::ProviderPermanent { .. }
        ));
    }

    #[tokio::test]
    async fn cancellation_before_start_issues_no_calls() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let personas = personas(4);
        let feature = feature();
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let progress = BatchProgress::new();

        let outcome = executor(provider.clone(), Arc::new(InMemoryResultCache::new()))
            .execute(
                &SimulationPair::for_feature(&personas, &feature),
                &BatchControl::new()
                    .with_cancellation(rx)
                    .with_progress(progress.clone()),
            )
            .await;

        assert_eq!(provider.call_count(), 0);
        assert!(outcome.cancelled);
        assert_eq!(outcome.failures.len(), 4);
        assert!(outcome
            .failures
            .failures
            .iter()
            .all(|f| f.reason == FailureReason::Cancelled));
        assert!(progress.is_finished());
    }

    struct CancelAfterFirstChunk {
        tx: watch::Sender<bool>,
        chunks: Mutex<Vec<ChunkProgress>>,
    }

    #[async_trait]
    impl ResponseSink for CancelAfterFirstChunk {
        async fn accept(
            &self,
            progress: ChunkProgress,
            _responses: &[SimulationResponse],
        ) -> Result<(), DomainError> {
            self.chunks.lock().unwrap().push(progress);
            let _ = self.tx.send(true);
            Ok(())
        }
    }

    #[tokio::test]
    async fn cancellation_between_chunks_keeps_finished_work() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let personas = personas(6);
        let feature = feature();
        let (tx, rx) = watch::channel(false);
        let sink = Arc::new(CancelAfterFirstChunk {
            tx,
            chunks: Mutex::new(Vec::new()),
        });

        let outcome = executor(provider.clone(), Arc::new(InMemoryResultCache::new()))
            .execute(
                &SimulationPair::for_feature(&personas, &feature),
                &BatchControl::new().with_cancellation(rx).with_sink(sink.clone()),
            )
            .await;

        assert!(outcome.cancelled);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(outcome.responses.len(), 2);
        assert_eq!(outcome.failures.len(), 4);
        assert_eq!(outcome.accounted(), 6);

        let chunks = sink.chunks.lock().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].completed, 2);
        assert_eq!(chunks[0].total, 6);
    }

    #[tokio::test]
    async fn discarding_mode_streams_to_sink_only() {
        struct Counting(AtomicUsize);

        #[async_trait]
        impl ResponseSink for Counting {
            async fn accept(
                &self,
                _progress: ChunkProgress,
                responses: &[SimulationResponse],
            ) -> Result<(), DomainError> {
                self.0.fetch_add(responses.len(), Ordering::SeqCst);
                Ok(())
            }
        }

        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let personas = personas(5);
        let feature = feature();
        let sink = Arc::new(Counting(AtomicUsize::new(0)));

        let outcome = executor(provider, Arc::new(InMemoryResultCache::new()))
            .execute(
                &SimulationPair::for_feature(&personas, &feature),
                &BatchControl::new().with_sink(sink.clone()).discarding_responses(),
            )
            .await;

        assert!(outcome.responses.is_empty());
        assert_eq!(sink.0.load(Ordering::SeqCst), 5);
    }

    struct RejectFirstChunk;

    #[async_trait]
    impl ResponseSink for RejectFirstChunk {
        async fn accept(
            &self,
            progress: ChunkProgress,
            _responses: &[SimulationResponse],
        ) -> Result<(), DomainError> {
            if progress.chunk_index == 0 {
                return Err(DomainError::new(ErrorCode::StorageError, "store unavailable"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn rejected_chunks_are_kept_when_discarding() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let personas = personas(4);
        let feature = feature();

        let outcome = executor(provider, Arc::new(InMemoryResultCache::new()))
            .execute(
                &SimulationPair::for_feature(&personas, &feature),
                &BatchControl::new()
                    .with_sink(Arc::new(RejectFirstChunk))
                    .discarding_responses(),
            )
            .await;

        assert_eq!(outcome.sink_failures, vec![0]);
        assert_eq!(outcome.responses.len(), 2);
        let kept: Vec<_> = outcome.responses.iter().map(|r| r.persona_id).collect();
        assert!(kept.iter().all(|id| personas[..2].iter().any(|p| p.id == *id)));
    }

    #[tokio::test]
    async fn rejected_chunks_are_reported_when_retaining() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let personas = personas(4);
        let feature = feature();

        let outcome = executor(provider, Arc::new(InMemoryResultCache::new()))
            .execute(
                &SimulationPair::for_feature(&personas, &feature),
                &BatchControl::new().with_sink(Arc::new(RejectFirstChunk)),
            )
            .await;

        assert_eq!(outcome.sink_failures, vec![0]);
        assert_eq!(outcome.responses.len(), 4);
    }

    #[tokio::test]
    async fn batch_runs_on_a_spawned_task() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(ADOPT));
        let executor = Arc::new(executor(provider, Arc::new(InMemoryResultCache::new())));
        let personas = personas(5);
        let feature = feature();

        let outcome = tokio::spawn(async move {
            let pairs = SimulationPair::for_feature(&personas, &feature);
            executor.execute(&pairs, &BatchControl::new()).await
        })
        .await
        .unwrap();

        assert_eq!(outcome.responses.len(), 5);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn backoff_grows_exponentially() {
        let settings = ExecutorSettings {
            backoff_base: Duration::from_secs(1),
            backoff_factor: 2,
            ..ExecutorSettings::default()
        };
        assert_eq!(settings.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(settings.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(settings.backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn progress_tracks_completion() {
        let progress = BatchProgress::new();
        assert!(!progress.is_finished());
        progress.start(3);
        progress.advance(2);
        assert_eq!(progress.completed(), 2);
        progress.advance(1);
        assert!(progress.is_finished());
    }
}
