//! Storage Adapters
//!
//! Implementations of the ExperimentRepository port.
//!
//! - **InMemoryExperimentRepository** - Experiments in memory (testing/demo)

mod in_memory_experiment_repository;

pub use in_memory_experiment_repository::InMemoryExperimentRepository;
