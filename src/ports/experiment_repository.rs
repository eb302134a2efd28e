//! Experiment repository port.
//!
//! The core treats experiment storage as an opaque key-value store keyed by
//! [`ExperimentId`]; it never implements persistence itself.

use async_trait::async_trait;

use crate::domain::experiment::Experiment;
use crate::domain::foundation::{DomainError, ExperimentId};

/// Repository port for Experiment aggregate persistence.
#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    /// Store a new experiment and return its id.
    ///
    /// # Errors
    ///
    /// - `StorageError` if an experiment with the same id already exists
    async fn create(&self, experiment: &Experiment) -> Result<ExperimentId, DomainError>;

    /// Load an experiment.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the id is unknown
    async fn get(&self, id: &ExperimentId) -> Result<Experiment, DomainError>;

    /// Replace a stored experiment.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment was never created
    async fn update(&self, experiment: &Experiment) -> Result<(), DomainError>;

    /// Find a public experiment by its share token.
    ///
    /// Private experiments are never returned, even with a stale token.
    async fn find_by_share_token(&self, token: &str) -> Result<Option<Experiment>, DomainError>;

    /// Experiments forked from the given one, oldest first.
    async fn find_forks(&self, parent_id: &ExperimentId) -> Result<Vec<Experiment>, DomainError>;
}
