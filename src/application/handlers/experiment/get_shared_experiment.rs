//! GetSharedExperimentHandler - Query handler for viewing a shared experiment.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::experiment::Experiment;
use crate::domain::foundation::DomainError;
use crate::ports::ExperimentRepository;

/// Query for an experiment by share token.
#[derive(Debug, Clone)]
pub struct GetSharedExperimentQuery {
    pub share_token: String,
}

#[derive(Debug, Error)]
pub enum GetSharedExperimentError {
    /// Unknown, revoked, or private.
    #[error("no shared experiment for this link")]
    NotFound,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Handler for resolving share links.
pub struct GetSharedExperimentHandler {
    repository: Arc<dyn ExperimentRepository>,
}

impl GetSharedExperimentHandler {
    pub fn new(repository: Arc<dyn ExperimentRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetSharedExperimentQuery,
    ) -> Result<Experiment, GetSharedExperimentError> {
        let token = query.share_token.trim();
        if token.is_empty() {
            return Err(GetSharedExperimentError::NotFound);
        }

        self.repository
            .find_by_share_token(token)
            .await?
            .ok_or(GetSharedExperimentError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryExperimentRepository;
    use crate::application::handlers::experiment::test_support::stored_experiment;

    #[tokio::test]
    async fn resolves_a_shared_experiment() {
        let repository = Arc::new(InMemoryExperimentRepository::new());
        let mut experiment = stored_experiment(repository.clone()).await;
        let token = experiment.share();
        repository.update(&experiment).await.unwrap();

        let found = GetSharedExperimentHandler::new(repository)
            .handle(GetSharedExperimentQuery { share_token: token })
            .await
            .unwrap();

        assert_eq!(found.id(), experiment.id());
    }

    #[tokio::test]
    async fn unknown_or_blank_tokens_are_not_found() {
        let handler = GetSharedExperimentHandler::new(Arc::new(InMemoryExperimentRepository::new()));

        for token in ["", "  ", "deadbeef"] {
            let err = handler
                .handle(GetSharedExperimentQuery {
                    share_token: token.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, GetSharedExperimentError::NotFound));
        }
    }
}
