//! PersonaGenerator - enriches every seed of a company context.
//!
//! Seeds are independent, so enrichment calls run concurrently up to a
//! configured limit. Personas come back in seed order.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::info;

use crate::domain::company::CompanyContext;
use crate::domain::persona::SyntheticPersona;

use super::PersonaEnricher;

/// Builds the persona panel for a company context.
pub struct PersonaGenerator {
    enricher: Arc<PersonaEnricher>,
    concurrency: usize,
}

impl PersonaGenerator {
    pub fn new(enricher: Arc<PersonaEnricher>, concurrency: usize) -> Self {
        Self {
            enricher,
            concurrency: concurrency.max(1),
        }
    }

    /// Enriches every seed of `context`, preserving seed order.
    pub async fn generate(&self, context: &CompanyContext) -> Vec<SyntheticPersona> {
        let enricher = &self.enricher;
        let personas: Vec<SyntheticPersona> = stream::iter(context.persona_seeds().iter().cloned())
            .map(move |seed| async move { enricher.enrich(&seed, context).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let degraded = personas.iter().filter(|p| p.degraded).count();
        info!(
            company = %context.input().name,
            personas = personas.len(),
            degraded,
            "Persona panel generated"
        );
        personas
    }
}
