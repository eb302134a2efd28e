//! CompanyContext - immutable company description plus derived annotations.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::input::{BusinessModel, CompanyInput, InsufficientContextError};
use crate::domain::persona::{market_segments, PersonaSeed, SeedGenerator};

/// Company description enriched with derived annotations and persona seeds.
///
/// Created once when an experiment is created; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyContext {
    input: CompanyInput,
    enriched_context: BTreeMap<String, Value>,
    persona_seeds: Vec<PersonaSeed>,
}

impl CompanyContext {
    /// Validates the input, annotates it, and derives `persona_count` seeds.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientContextError` when name, industry or target
    /// market is blank. No seeds are produced in that case.
    pub fn build(
        input: CompanyInput,
        persona_count: usize,
    ) -> Result<Self, InsufficientContextError> {
        let assessment = input.assess()?;
        let persona_seeds = SeedGenerator::from_input(&input, persona_count)?;

        let mut enriched_context = BTreeMap::new();
        enriched_context.insert(
            "industry_characteristics".to_string(),
            json!(industry_characteristics(&input.industry)),
        );
        enriched_context.insert(
            "typical_customer_profiles".to_string(),
            json!(customer_profiles(input.business_model)),
        );
        enriched_context.insert(
            "competitive_landscape".to_string(),
            json!(format!(
                "Competitive landscape in {} with {} model",
                input.industry.trim(),
                input.business_model
            )),
        );
        enriched_context.insert(
            "adoption_patterns".to_string(),
            json!(input.company_size.adoption_pattern()),
        );
        enriched_context.insert(
            "market_segments".to_string(),
            json!(market_segments(&input.target_market)),
        );
        enriched_context.insert(
            "validation_quality_score".to_string(),
            json!(assessment.quality_score),
        );
        enriched_context.insert("suggestions".to_string(), json!(assessment.suggestions));

        Ok(Self {
            input,
            enriched_context,
            persona_seeds,
        })
    }

    pub fn input(&self) -> &CompanyInput {
        &self.input
    }

    pub fn enriched_context(&self) -> &BTreeMap<String, Value> {
        &self.enriched_context
    }

    pub fn persona_seeds(&self) -> &[PersonaSeed] {
        &self.persona_seeds
    }

    /// Quality score computed when the context was built.
    pub fn quality_score(&self) -> f64 {
        self.enriched_context
            .get("validation_quality_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// One-paragraph summary used in model prompts.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} is a {} {} company in the {} industry targeting {}.",
            self.input.name.trim(),
            self.input.company_size,
            self.input.business_model,
            self.input.industry.trim(),
            self.input.target_market.trim()
        );
        if let Some(description) = self.input.description.as_deref().map(str::trim) {
            if !description.is_empty() {
                summary.push(' ');
                summary.push_str(description);
            }
        }
        summary
    }
}

fn industry_characteristics(industry: &str) -> Vec<String> {
    vec![
        format!("Operates in {} sector", industry.trim()),
        "Subject to industry-specific regulations".to_string(),
        "Follows industry best practices".to_string(),
    ]
}

fn customer_profiles(business_model: BusinessModel) -> Vec<&'static str> {
    const BUSINESS: [&str; 3] = [
        "Decision makers in target companies",
        "Technical evaluators and implementers",
        "Budget holders and procurement teams",
    ];
    const CONSUMER: [&str; 3] = [
        "Individual consumers in target market",
        "Early adopters and tech enthusiasts",
        "Price-conscious mainstream users",
    ];

    match business_model {
        BusinessModel::B2B => BUSINESS.to_vec(),
        BusinessModel::B2C | BusinessModel::Marketplace => CONSUMER.to_vec(),
        BusinessModel::B2B2C => BUSINESS.iter().chain(CONSUMER.iter()).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::CompanySize;

    fn input() -> CompanyInput {
        CompanyInput::new(
            "Flowly",
            "Software",
            BusinessModel::B2B,
            "B2B SaaS ops teams",
            CompanySize::Startup,
        )
    }

    #[test]
    fn build_derives_requested_seed_count() {
        let context = CompanyContext::build(input(), 5).unwrap();
        assert_eq!(context.persona_seeds().len(), 5);
    }

    #[test]
    fn build_fails_before_seeding_on_blank_market() {
        let mut input = input();
        input.target_market = " ".to_string();
        let err = CompanyContext::build(input, 5).unwrap_err();
        assert_eq!(err.missing_fields, vec!["target_market"]);
    }

    #[test]
    fn build_annotates_context() {
        let context = CompanyContext::build(input(), 5).unwrap();
        let enriched = context.enriched_context();

        assert_eq!(
            enriched.get("adoption_patterns"),
            Some(&json!("Fast adoption, high risk tolerance"))
        );
        assert_eq!(
            enriched.get("market_segments"),
            Some(&json!(["B2B SaaS ops teams"]))
        );
        assert!((context.quality_score() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn summary_mentions_company_and_market() {
        let context = CompanyContext::build(
            input().with_description("Automates recurring ops work."),
            5,
        )
        .unwrap();
        let summary = context.summary();
        assert!(summary.starts_with("Flowly is a Startup B2B company"));
        assert!(summary.ends_with("Automates recurring ops work."));
    }

    #[test]
    fn serde_roundtrip_preserves_context() {
        let context = CompanyContext::build(input(), 6).unwrap();
        let json = serde_json::to_string(&context).unwrap();
        let restored: CompanyContext = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, context);
    }
}
