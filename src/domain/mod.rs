//! Domain layer containing the simulation's business logic and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, status)
//! - `company` - Company input, validation, and enriched context
//! - `persona` - Axis bijection, seeds, persona model, and enrichment parsing
//! - `feature` - Feature descriptions under evaluation
//! - `simulation` - Prompt building, response parsing, and outcomes
//! - `insights` - Aggregation, clustering, and export rows
//! - `experiment` - The Experiment aggregate

pub mod company;
pub mod experiment;
pub mod feature;
pub mod foundation;
pub mod insights;
pub mod persona;
pub mod simulation;
