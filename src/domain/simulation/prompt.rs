//! Prompt rendering and cache-key derivation.
//!
//! Rendering is a pure function of its inputs: the same persona and feature
//! always produce byte-identical text, which is what makes the prompt hash a
//! usable cache key.

use sha2::{Digest, Sha256};

use crate::domain::feature::FeatureDescription;
use crate::domain::persona::SyntheticPersona;

/// Labels of the four lines the model must answer with.
pub const RESPONSE_LABELS: [&str; 4] = ["DECISION", "CONFIDENCE", "REASONING", "KEY_FACTORS"];

/// Renders the evaluation prompt for a persona and feature.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(persona: &SyntheticPersona, feature: &FeatureDescription) -> String {
        let demographics = &persona.demographics;
        let psychographics = &persona.psychographics;
        let behavior = &persona.behavior_patterns;
        let context = &persona.contextual_factors;

        let mut prompt = String::new();

        prompt.push_str(&format!("You are {}, a {}", persona.name.trim(), demographics.role));
        if let Some(size) = demographics.company_size {
            prompt.push_str(&format!(" at a {} company", size));
        }
        if let Some(industry) = &demographics.industry {
            prompt.push_str(&format!(" in the {} industry", industry));
        }
        prompt.push_str(".\n\n");

        prompt.push_str(&format!("Persona ID: {}\n", persona.id));
        prompt.push_str("Your characteristics:\n");
        prompt.push_str(&format!("- Age: {} ({})\n", demographics.age, demographics.age_bracket));
        prompt.push_str(&format!("- Income: {}\n", demographics.income));
        prompt.push_str(&format!("- Personality: {}\n", list(&psychographics.traits)));
        prompt.push_str(&format!("- Values: {}\n", list(&psychographics.values)));
        prompt.push_str(&format!("- Motivations: {}\n", list(&psychographics.motivations)));
        prompt.push_str(&format!("- Pain points: {}\n", list(&psychographics.pain_points)));
        prompt.push_str(&format!("- Technology adoption: {}\n", behavior.technology_adoption));
        prompt.push_str(&format!("- Risk tolerance: {}\n", behavior.risk_tolerance));
        prompt.push_str(&format!("- Decision-making style: {}\n", behavior.decision_making_style));
        prompt.push_str(&format!("- Information sources: {}\n", list(&behavior.information_sources)));
        prompt.push_str(&format!("- Current solutions: {}\n", list(&context.current_solutions)));
        prompt.push_str(&format!("- Budget: {}\n", context.budget));
        prompt.push_str(&format!("- Time constraints: {}\n", context.time_constraints));
        prompt.push_str(&format!("- Team influence: {}\n", context.team_influence));

        prompt.push_str("\nA company is launching this feature:\n");
        prompt.push_str(&format!("Feature: {}\n", feature.name.trim()));
        prompt.push_str(&format!("Description: {}\n", feature.description.trim()));
        prompt.push_str(&format!("Target user: {}\n", feature.target_user.trim()));
        prompt.push_str(&format!("Value proposition: {}\n", feature.value_proposition.trim()));
        prompt.push_str(&format!("Pricing: {}\n", feature.pricing_label()));
        if let Some(complexity) = feature.implementation_complexity {
            prompt.push_str(&format!("Implementation complexity: {}\n", complexity));
        }
        if let Some(comparison) = feature.competitor_comparison.as_deref().map(str::trim) {
            if !comparison.is_empty() {
                prompt.push_str(&format!("Compared to competitors: {}\n", comparison));
            }
        }

        prompt.push_str("\nWould you adopt this feature? Respond with exactly these four lines:\n");
        prompt.push_str("DECISION: [ADOPT/REJECT/UNSURE]\n");
        prompt.push_str("CONFIDENCE: [0.0-1.0]\n");
        prompt.push_str("REASONING: [One sentence explaining your decision]\n");
        prompt.push_str("KEY_FACTORS: [2-3 most important factors, comma-separated]");
        prompt
    }

    /// Stable cache key for a rendered prompt: lowercase hex SHA-256.
    pub fn cache_key(prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature::ImplementationComplexity;
    use crate::domain::persona::{fixtures, TechnologyAdoption};
    use proptest::prelude::*;

    fn automation() -> FeatureDescription {
        FeatureDescription::new(
            "AI workflow automation",
            "Builds workflows from recorded ops tasks",
            "Cut manual ops work in half",
            "Operations managers",
        )
    }

    #[test]
    fn prompt_surfaces_persona_and_feature_attributes() {
        let persona = fixtures::persona("Operations Manager", TechnologyAdoption::EarlyMajority);
        let prompt = PromptBuilder::build(&persona, &automation());

        for needle in [
            "Analytical, Pragmatic",
            "Efficiency",
            "Too many disconnected tools",
            "Early Majority",
            "Spreadsheets",
            "AI workflow automation",
            "Cut manual ops work in half",
            "Operations managers",
            "Pricing: Not specified",
        ] {
            assert!(prompt.contains(needle), "prompt missing {needle:?}");
        }
        assert!(prompt.contains(&persona.id.to_string()));
    }

    #[test]
    fn prompt_ends_with_four_labeled_lines() {
        let persona = fixtures::persona("IT Director", TechnologyAdoption::Laggard);
        let prompt = PromptBuilder::build(&persona, &automation());
        let footer: Vec<&str> = prompt.lines().rev().take(4).collect();
        for (line, label) in footer.iter().rev().zip(RESPONSE_LABELS) {
            assert!(line.starts_with(&format!("{label}:")));
        }
    }

    #[test]
    fn each_attribute_sits_on_its_own_line() {
        let persona = fixtures::persona("Operations Manager", TechnologyAdoption::EarlyMajority);
        let prompt = PromptBuilder::build(&persona, &automation());
        let lines: Vec<&str> = prompt.lines().collect();

        assert!(lines[0].starts_with(&format!("You are {}, a Operations Manager", persona.name)));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], format!("Persona ID: {}", persona.id));
        assert!(lines.contains(&"- Technology adoption: Early Majority"));
        assert!(lines.contains(&"Feature: AI workflow automation"));
        assert!(lines.contains(&"Pricing: Not specified"));
    }

    #[test]
    fn optional_feature_fields_are_rendered_when_present() {
        let persona = fixtures::persona("IT Director", TechnologyAdoption::Laggard);
        let feature = automation()
            .with_complexity(ImplementationComplexity::High)
            .with_competitor_comparison("Cheaper than Zapier");
        let prompt = PromptBuilder::build(&persona, &feature);
        assert!(prompt.contains("Implementation complexity: High"));
        assert!(prompt.contains("Compared to competitors: Cheaper than Zapier"));
    }

    #[test]
    fn distinct_personas_get_distinct_cache_keys() {
        let a = fixtures::persona("IT Director", TechnologyAdoption::Laggard);
        let b = fixtures::persona("IT Director", TechnologyAdoption::Laggard);
        let feature = automation();
        assert_ne!(
            PromptBuilder::cache_key(&PromptBuilder::build(&a, &feature)),
            PromptBuilder::cache_key(&PromptBuilder::build(&b, &feature))
        );
    }

    #[test]
    fn cache_key_is_hex_sha256() {
        let key = PromptBuilder::cache_key("hello");
        assert_eq!(
            key,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    proptest! {
        #[test]
        fn build_is_deterministic(name in "[A-Za-z ]{1,20}", description in ".{1,80}") {
            let persona = fixtures::persona("Product Manager", TechnologyAdoption::EarlyAdopter);
            let feature = FeatureDescription::new(name, description, "value", "users");
            let first = PromptBuilder::build(&persona, &feature);
            let second = PromptBuilder::build(&persona.clone(), &feature.clone());
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(PromptBuilder::cache_key(&first), PromptBuilder::cache_key(&second));
        }
    }
}
