//! SyntheticPersona - a fully enriched member of the simulated panel.

use serde::{Deserialize, Serialize};

use super::axes::{AgeBracket, AxisTuple, IncomeBracket, RiskTolerance, TechnologyAdoption};
use crate::domain::company::CompanySize;
use crate::domain::foundation::PersonaId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u8,
    pub age_bracket: AgeBracket,
    pub role: String,
    pub company_size: Option<CompanySize>,
    pub industry: Option<String>,
    pub income: IncomeBracket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Psychographics {
    pub traits: Vec<String>,
    pub values: Vec<String>,
    pub motivations: Vec<String>,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPatterns {
    pub technology_adoption: TechnologyAdoption,
    pub decision_making_style: String,
    pub risk_tolerance: RiskTolerance,
    pub information_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualFactors {
    pub current_solutions: Vec<String>,
    pub budget: String,
    pub time_constraints: String,
    pub team_influence: String,
}

/// A synthetic panel member.
///
/// Immutable after generation. When enrichment could not supply every field,
/// the gaps are backfilled with defaults consistent with the persona's axes,
/// `degraded` is set, and `degraded_fields` lists what was backfilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticPersona {
    pub id: PersonaId,
    pub name: String,
    /// Market segment the persona's seed was assigned to.
    pub segment: String,
    pub demographics: Demographics,
    pub psychographics: Psychographics,
    pub behavior_patterns: BehaviorPatterns,
    pub contextual_factors: ContextualFactors,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default)]
    pub degraded_fields: Vec<String>,
}

impl SyntheticPersona {
    /// The persona's four diversity-axis values.
    pub fn axes(&self) -> AxisTuple {
        AxisTuple {
            age_bracket: self.demographics.age_bracket,
            income_bracket: self.demographics.income,
            risk_tolerance: self.behavior_patterns.risk_tolerance,
            technology_adoption: self.behavior_patterns.technology_adoption,
        }
    }

    /// Names of required fields that are empty.
    ///
    /// `current_solutions` may legitimately be empty and is not checked.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let mut check_text = |field: &'static str, value: &str| {
            if value.trim().is_empty() {
                missing.push(field);
            }
        };
        check_text("name", &self.name);
        check_text("role", &self.demographics.role);
        check_text("decision_making_style", &self.behavior_patterns.decision_making_style);
        check_text("budget", &self.contextual_factors.budget);
        check_text("time_constraints", &self.contextual_factors.time_constraints);
        check_text("team_influence", &self.contextual_factors.team_influence);

        let lists: [(&'static str, &Vec<String>); 5] = [
            ("traits", &self.psychographics.traits),
            ("values", &self.psychographics.values),
            ("motivations", &self.psychographics.motivations),
            ("pain_points", &self.psychographics.pain_points),
            ("information_sources", &self.behavior_patterns.information_sources),
        ];
        for (field, values) in lists {
            if values.iter().all(|v| v.trim().is_empty()) {
                missing.push(field);
            }
        }
        missing
    }

    /// Returns true when every required field is populated.
    pub fn is_complete(&self) -> bool {
        self.missing_required_fields().is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A complete persona for use in tests across the crate.
    pub fn persona(role: &str, technology_adoption: TechnologyAdoption) -> SyntheticPersona {
        SyntheticPersona {
            id: PersonaId::new(),
            name: "Sarah Chen".to_string(),
            segment: "B2B SaaS ops teams".to_string(),
            demographics: Demographics {
                age: 34,
                age_bracket: AgeBracket::From25To34,
                role: role.to_string(),
                company_size: Some(CompanySize::MidMarket),
                industry: Some("Software".to_string()),
                income: IncomeBracket::From100KTo150K,
            },
            psychographics: Psychographics {
                traits: vec!["Analytical".to_string(), "Pragmatic".to_string()],
                values: vec!["Efficiency".to_string()],
                motivations: vec!["Reduce manual work".to_string()],
                pain_points: vec!["Too many disconnected tools".to_string()],
            },
            behavior_patterns: BehaviorPatterns {
                technology_adoption,
                decision_making_style: "Data-driven".to_string(),
                risk_tolerance: RiskTolerance::Medium,
                information_sources: vec!["Industry reports".to_string()],
            },
            contextual_factors: ContextualFactors {
                current_solutions: vec!["Spreadsheets".to_string()],
                budget: "$10K-$50K annually".to_string(),
                time_constraints: "Quarterly planning cycles".to_string(),
                team_influence: "Recommends to leadership".to_string(),
            },
            degraded: false,
            degraded_fields: Vec::new(),
        }
    }
}
