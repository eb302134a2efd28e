//! ShareExperimentHandler - Command handler for public share links.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};
use crate::ports::ExperimentRepository;

/// What to do with an experiment's visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    /// Make public and issue (or reuse) a share token.
    Share,
    /// Make private and invalidate the token.
    Revoke,
}

/// Command to change an experiment's visibility.
#[derive(Debug, Clone)]
pub struct ShareExperimentCommand {
    pub experiment_id: ExperimentId,
    pub action: ShareAction,
}

/// Result of a visibility change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareExperimentResult {
    pub experiment_id: ExperimentId,
    pub is_public: bool,
    pub share_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ShareExperimentError {
    #[error("experiment not found: {0}")]
    NotFound(ExperimentId),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for ShareExperimentError {
    fn from(err: DomainError) -> Self {
        ShareExperimentError::Domain(err)
    }
}

/// Handler for sharing and unsharing experiments.
pub struct ShareExperimentHandler {
    repository: Arc<dyn ExperimentRepository>,
}

impl ShareExperimentHandler {
    pub fn new(repository: Arc<dyn ExperimentRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: ShareExperimentCommand,
    ) -> Result<ShareExperimentResult, ShareExperimentError> {
        let mut experiment = self
            .repository
            .get(&cmd.experiment_id)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ExperimentNotFound => ShareExperimentError::NotFound(cmd.experiment_id),
                _ => ShareExperimentError::Domain(e),
            })?;

        match cmd.action {
            ShareAction::Share => {
                experiment.share();
            }
            ShareAction::Revoke => experiment.revoke_share(),
        }
        self.repository.update(&experiment).await?;

        info!(
            experiment_id = %experiment.id(),
            is_public = experiment.is_public(),
            "Experiment visibility changed"
        );

        Ok(ShareExperimentResult {
            experiment_id: experiment.id(),
            is_public: experiment.is_public(),
            share_token: experiment.share_token().map(str::to_string),
        })
    }
}
