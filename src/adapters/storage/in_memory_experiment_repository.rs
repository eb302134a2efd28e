//! In-Memory Experiment Repository Adapter
//!
//! Stores experiments in memory, keyed by id. Useful for tests, the demo
//! binary, and embedding the pipeline where the host owns persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::experiment::Experiment;
use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};
use crate::ports::ExperimentRepository;

/// In-memory storage for experiments
#[derive(Debug, Clone, Default)]
pub struct InMemoryExperimentRepository {
    experiments: Arc<RwLock<HashMap<ExperimentId, Experiment>>>,
}

impl InMemoryExperimentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored experiments
    pub async fn count(&self) -> usize {
        self.experiments.read().await.len()
    }
}

fn not_found(id: &ExperimentId) -> DomainError {
    DomainError::new(ErrorCode::ExperimentNotFound, "Experiment not found")
        .with_detail("experiment_id", id.to_string())
}

#[async_trait]
impl ExperimentRepository for InMemoryExperimentRepository {
    async fn create(&self, experiment: &Experiment) -> Result<ExperimentId, DomainError> {
        let mut experiments = self.experiments.write().await;
        let id = experiment.id();
        if experiments.contains_key(&id) {
            return Err(
                DomainError::new(ErrorCode::StorageError, "Experiment already exists")
                    .with_detail("experiment_id", id.to_string()),
            );
        }
        experiments.insert(id, experiment.clone());
        Ok(id)
    }

    async fn get(&self, id: &ExperimentId) -> Result<Experiment, DomainError> {
        self.experiments
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, experiment: &Experiment) -> Result<(), DomainError> {
        let mut experiments = self.experiments.write().await;
        let id = experiment.id();
        match experiments.get_mut(&id) {
            Some(stored) => {
                *stored = experiment.clone();
                Ok(())
            }
            None => Err(not_found(&id)),
        }
    }

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Experiment>, DomainError> {
        Ok(self
            .experiments
            .read()
            .await
            .values()
            .find(|e| e.is_public() && e.share_token() == Some(token))
            .cloned())
    }

    async fn find_forks(&self, parent_id: &ExperimentId) -> Result<Vec<Experiment>, DomainError> {
        let mut forks: Vec<Experiment> = self
            .experiments
            .read()
            .await
            .values()
            .filter(|e| e.forked_from() == Some(*parent_id))
            .cloned()
            .collect();
        forks.sort_by_key(|e| e.created_at());
        Ok(forks)
    }
}
