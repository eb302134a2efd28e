//! PersonaEnricher - turns a seed into a complete SyntheticPersona.
//!
//! The free-text parts of a persona come from one model call with a fixed
//! template. If the answer is malformed or incomplete, one stricter follow-up
//! asks only for the missing fields. Whatever is still missing afterwards is
//! backfilled from axis-consistent defaults and the persona is marked
//! degraded. Enrichment never fails: a provider error counts as an empty
//! answer.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::company::CompanyContext;
use crate::domain::foundation::PersonaId;
use crate::domain::persona::{
    enrichment_prompt, follow_up_prompt, EnrichmentFields, PersonaSeed, SyntheticPersona,
};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata};

const SYSTEM_PROMPT: &str =
    "You create realistic synthetic personas for market research. Answer with JSON only.";

/// Model parameters for enrichment calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 800,
        }
    }
}

/// Enriches persona seeds through the AI provider.
pub struct PersonaEnricher {
    ai_provider: Arc<dyn AIProvider>,
    settings: EnrichmentSettings,
}

impl PersonaEnricher {
    pub fn new(ai_provider: Arc<dyn AIProvider>, settings: EnrichmentSettings) -> Self {
        Self {
            ai_provider,
            settings,
        }
    }

    /// Builds a complete persona for `seed`.
    pub async fn enrich(&self, seed: &PersonaSeed, context: &CompanyContext) -> SyntheticPersona {
        let persona_id = PersonaId::new();

        let prompt = enrichment_prompt(seed, context);
        let mut fields = self.ask(persona_id, seed, prompt, "enrichment").await;

        if !fields.is_complete() {
            let missing = fields.missing();
            debug!(
                persona_id = %persona_id,
                seed_id = %seed.seed_id,
                missing = ?missing,
                "Enrichment incomplete, sending follow-up"
            );
            let follow_up = follow_up_prompt(seed, &missing);
            let extra = self.ask(persona_id, seed, follow_up, "enrichment_follow_up").await;
            fields = fields.merge(extra);
        }

        let persona = fields.into_persona(persona_id, seed);
        if persona.degraded {
            warn!(
                persona_id = %persona_id,
                seed_id = %seed.seed_id,
                degraded_fields = ?persona.degraded_fields,
                "Persona backfilled with defaults"
            );
        }
        persona
    }

    async fn ask(
        &self,
        persona_id: PersonaId,
        seed: &PersonaSeed,
        prompt: String,
        purpose: &'static str,
    ) -> EnrichmentFields {
        let request = CompletionRequest::new(RequestMetadata::new(purpose).with_persona(persona_id))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        match self.ai_provider.complete(request).await {
            Ok(response) => EnrichmentFields::parse(&response.content, seed.age_bracket),
            Err(e) => {
                warn!(
                    persona_id = %persona_id,
                    seed_id = %seed.seed_id,
                    purpose,
                    error = %e,
                    "Enrichment call failed"
                );
                EnrichmentFields::default()
            }
        }
    }
}
