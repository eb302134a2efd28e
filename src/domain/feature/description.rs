//! FeatureDescription - the candidate feature personas are asked about.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// How hard the feature is to roll out for the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplementationComplexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for ImplementationComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImplementationComplexity::Low => "Low",
            ImplementationComplexity::Medium => "Medium",
            ImplementationComplexity::High => "High",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescription {
    pub name: String,
    pub description: String,
    pub value_proposition: String,
    pub target_user: String,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub implementation_complexity: Option<ImplementationComplexity>,
    #[serde(default)]
    pub competitor_comparison: Option<String>,
}

impl FeatureDescription {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        value_proposition: impl Into<String>,
        target_user: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value_proposition: value_proposition.into(),
            target_user: target_user.into(),
            pricing_model: None,
            implementation_complexity: None,
            competitor_comparison: None,
        }
    }

    pub fn with_pricing_model(mut self, pricing_model: impl Into<String>) -> Self {
        self.pricing_model = Some(pricing_model.into());
        self
    }

    pub fn with_complexity(mut self, complexity: ImplementationComplexity) -> Self {
        self.implementation_complexity = Some(complexity);
        self
    }

    pub fn with_competitor_comparison(mut self, comparison: impl Into<String>) -> Self {
        self.competitor_comparison = Some(comparison.into());
        self
    }

    /// Checks the required fields are present.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` for the first blank required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("value_proposition", &self.value_proposition),
            ("target_user", &self.target_user),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::empty_field(field));
            }
        }
        Ok(())
    }

    /// Detail score between 0.7 and 1.0 for a valid description.
    pub fn quality_score(&self) -> f64 {
        let mut score: f64 = 0.7;
        if self.description.trim().chars().count() >= 100 {
            score += 0.1;
        }
        if self.value_proposition.trim().chars().count() >= 50 {
            score += 0.1;
        }
        if self.pricing_model.as_deref().is_some_and(|p| !p.trim().is_empty()) {
            score += 0.05;
        }
        if self.implementation_complexity.is_some() {
            score += 0.05;
        }
        score.min(1.0)
    }

    /// Suggestions for making the description more useful to personas.
    pub fn suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::new();
        if self.description.trim().chars().count() < 30 {
            suggestions.push(
                "Feature description should be more detailed (at least 30 characters)"
                    .to_string(),
            );
        }
        if self.value_proposition.trim().chars().count() < 20 {
            suggestions.push("Value proposition should be more detailed".to_string());
        }
        suggestions
    }

    /// Pricing text as shown to personas.
    pub fn pricing_label(&self) -> &str {
        self.pricing_model
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("Not specified")
    }
}
