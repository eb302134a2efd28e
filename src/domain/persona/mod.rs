//! Persona module - seeds, enrichment, and the synthetic persona model.

mod axes;
mod defaults;
mod enrichment;
mod model;
mod seed;

pub use axes::{
    AgeBracket, AxisTuple, IncomeBracket, RiskTolerance, TechnologyAdoption, AXIS_COMBINATIONS,
};
pub use defaults::AxisDefaults;
pub use enrichment::{enrichment_prompt, follow_up_prompt, EnrichmentFields, ENRICHMENT_FIELDS};
pub use model::{
    BehaviorPatterns, ContextualFactors, Demographics, Psychographics, SyntheticPersona,
};
pub use seed::{market_segments, role_pool, PersonaSeed, SeedGenerator};

#[cfg(test)]
pub(crate) use model::fixtures;
