//! Raw company description supplied by the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How the company sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessModel {
    B2B,
    B2C,
    B2B2C,
    Marketplace,
}

impl BusinessModel {
    /// Returns the display label for this business model.
    pub fn label(&self) -> &'static str {
        match self {
            BusinessModel::B2B => "B2B",
            BusinessModel::B2C => "B2C",
            BusinessModel::B2B2C => "B2B2C",
            BusinessModel::Marketplace => "Marketplace",
        }
    }

    /// Returns true when buyers are organizations rather than individuals.
    pub fn sells_to_businesses(&self) -> bool {
        matches!(self, BusinessModel::B2B)
    }
}

impl fmt::Display for BusinessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Size of the company running the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    Startup,
    #[serde(rename = "SMB")]
    Smb,
    #[serde(rename = "Mid-Market")]
    MidMarket,
    Enterprise,
}

impl CompanySize {
    /// Returns the display label for this company size.
    pub fn label(&self) -> &'static str {
        match self {
            CompanySize::Startup => "Startup",
            CompanySize::Smb => "SMB",
            CompanySize::MidMarket => "Mid-Market",
            CompanySize::Enterprise => "Enterprise",
        }
    }

    /// Typical adoption behaviour for customers of this size.
    pub fn adoption_pattern(&self) -> &'static str {
        match self {
            CompanySize::Startup => "Fast adoption, high risk tolerance",
            CompanySize::Smb => "Moderate adoption, cost-conscious",
            CompanySize::MidMarket => "Careful evaluation, ROI-focused",
            CompanySize::Enterprise => "Slow adoption, extensive evaluation",
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The company has not described itself well enough to derive even one
/// customer segment. Raised before any model call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Insufficient context for persona generation: missing {}", .missing_fields.join(", "))]
pub struct InsufficientContextError {
    pub missing_fields: Vec<String>,
}

impl InsufficientContextError {
    /// Creates an error naming the fields that lacked signal.
    pub fn missing(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            missing_fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Company description as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInput {
    pub name: String,
    pub industry: String,
    pub business_model: BusinessModel,
    pub target_market: String,
    pub company_size: CompanySize,
    #[serde(default)]
    pub description: Option<String>,
}

/// Outcome of checking a company description for persona generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputAssessment {
    /// 0.0 to 1.0; higher means more signal for persona generation.
    pub quality_score: f64,
    pub suggestions: Vec<String>,
}

impl CompanyInput {
    /// Creates a company input without a free-text description.
    pub fn new(
        name: impl Into<String>,
        industry: impl Into<String>,
        business_model: BusinessModel,
        target_market: impl Into<String>,
        company_size: CompanySize,
    ) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            business_model,
            target_market: target_market.into(),
            company_size,
            description: None,
        }
    }

    /// Sets the free-text company description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks that the input carries enough signal to derive personas.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientContextError` naming every blank required field.
    pub fn assess(&self) -> Result<InputAssessment, InsufficientContextError> {
        let required = [
            ("name", &self.name),
            ("industry", &self.industry),
            ("target_market", &self.target_market),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(InsufficientContextError::missing(missing));
        }

        let mut suggestions = Vec::new();
        let mut quality_score: f64 = 0.7;

        let market_len = self.target_market.trim().chars().count();
        if market_len < 20 {
            suggestions.push(
                "Target market description should be more detailed (at least 20 characters)"
                    .to_string(),
            );
        } else if market_len >= 50 {
            quality_score += 0.1;
        }

        let description_len = self
            .description
            .as_deref()
            .map(|d| d.trim().chars().count())
            .unwrap_or(0);
        if description_len < 10 {
            suggestions.push(
                "Company description would help generate more accurate personas".to_string(),
            );
        } else if description_len >= 50 {
            quality_score += 0.1;
        }

        if self.industry.trim().chars().count() >= 10 {
            quality_score += 0.1;
        }

        Ok(InputAssessment {
            quality_score: quality_score.min(1.0),
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saas_input() -> CompanyInput {
        CompanyInput::new(
            "Flowly",
            "Software",
            BusinessModel::B2B,
            "B2B SaaS ops teams",
            CompanySize::Startup,
        )
    }

    #[test]
    fn business_model_serializes_to_original_labels() {
        assert_eq!(serde_json::to_string(&BusinessModel::B2B2C).unwrap(), "\"B2B2C\"");
        assert_eq!(
            serde_json::to_string(&BusinessModel::Marketplace).unwrap(),
            "\"Marketplace\""
        );
    }

    #[test]
    fn company_size_uses_hyphenated_label() {
        assert_eq!(serde_json::to_string(&CompanySize::MidMarket).unwrap(), "\"Mid-Market\"");
        let size: CompanySize = serde_json::from_str("\"SMB\"").unwrap();
        assert_eq!(size, CompanySize::Smb);
    }

    #[test]
    fn assess_rejects_whitespace_target_market() {
        let mut input = saas_input();
        input.target_market = "   \t".to_string();

        let err = input.assess().unwrap_err();
        assert_eq!(err.missing_fields, vec!["target_market".to_string()]);
    }

    #[test]
    fn assess_lists_every_blank_field() {
        let mut input = saas_input();
        input.name = String::new();
        input.target_market = String::new();

        let err = input.assess().unwrap_err();
        assert_eq!(err.missing_fields, vec!["name", "target_market"]);
        assert!(err.to_string().contains("name, target_market"));
    }

    #[test]
    fn assess_scores_base_input_at_point_seven() {
        let assessment = saas_input().assess().unwrap();
        assert!((assessment.quality_score - 0.7).abs() < 1e-9);
        assert_eq!(assessment.suggestions.len(), 2);
    }

    #[test]
    fn assess_rewards_detail() {
        let input = CompanyInput::new(
            "Flowly",
            "Enterprise Software",
            BusinessModel::B2B,
            "Operations teams at B2B SaaS companies with 50 to 500 employees",
            CompanySize::Startup,
        )
        .with_description("Flowly automates recurring operational workflows for SaaS companies.");

        let assessment = input.assess().unwrap();
        assert!((assessment.quality_score - 1.0).abs() < 1e-9);
        assert!(assessment.suggestions.is_empty());
    }
}
