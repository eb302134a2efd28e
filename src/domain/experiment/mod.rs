//! Experiment module - the aggregate tying a persona panel to a feature.

mod aggregate;

pub use aggregate::Experiment;
