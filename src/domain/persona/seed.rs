//! Persona seed generation.
//!
//! Seeds are partial persona skeletons with fixed diversity-axis values. They
//! are derived deterministically from the company description so the same
//! company always yields the same panel skeleton.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::axes::{
    AgeBracket, AxisTuple, IncomeBracket, RiskTolerance, TechnologyAdoption, AXIS_COMBINATIONS,
};
use crate::domain::company::{
    BusinessModel, CompanyContext, CompanyInput, CompanySize, InsufficientContextError,
};

const B2B_ROLES: [&str; 8] = [
    "IT Director",
    "Product Manager",
    "Operations Manager",
    "CEO/Founder",
    "Finance Manager",
    "Sales Director",
    "Technical Lead",
    "Procurement Specialist",
];

const CONSUMER_ROLES: [&str; 8] = [
    "Tech-savvy Professional",
    "Budget-conscious Consumer",
    "Early Adopter",
    "Mainstream User",
    "Senior Executive",
    "Small Business Owner",
    "Freelancer",
    "Student",
];

const CUSTOMER_SIZES: [CompanySize; 4] = [
    CompanySize::Startup,
    CompanySize::Smb,
    CompanySize::MidMarket,
    CompanySize::Enterprise,
];

/// Partial persona sketch prior to enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSeed {
    pub seed_id: String,
    /// Market segment this seed was assigned to.
    pub segment: String,
    pub role: String,
    /// Industry and size of the persona's employer; only set for business buyers.
    pub industry: Option<String>,
    pub company_size: Option<CompanySize>,
    pub business_model: BusinessModel,
    pub age_bracket: AgeBracket,
    pub income_bracket: IncomeBracket,
    pub risk_tolerance: RiskTolerance,
    pub technology_adoption: TechnologyAdoption,
}

impl PersonaSeed {
    /// The seed's four diversity-axis values.
    pub fn axes(&self) -> AxisTuple {
        AxisTuple {
            age_bracket: self.age_bracket,
            income_bracket: self.income_bracket,
            risk_tolerance: self.risk_tolerance,
            technology_adoption: self.technology_adoption,
        }
    }
}

/// Derives structurally diverse seeds from a company description.
pub struct SeedGenerator;

impl SeedGenerator {
    /// Generates `count` seeds for an existing company context.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientContextError` when the target market is blank.
    pub fn generate(
        context: &CompanyContext,
        count: usize,
    ) -> Result<Vec<PersonaSeed>, InsufficientContextError> {
        Self::from_input(context.input(), count)
    }

    /// Generates `count` seeds straight from the raw company input.
    ///
    /// Seeds are spread round-robin across market segments, so no segment
    /// holds more than `ceil(count / segments)` seeds. No two seeds share all
    /// four axis values while `count <= AXIS_COMBINATIONS`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientContextError` when the target market is blank.
    pub fn from_input(
        input: &CompanyInput,
        count: usize,
    ) -> Result<Vec<PersonaSeed>, InsufficientContextError> {
        let segments = market_segments(&input.target_market);
        if segments.is_empty() {
            return Err(InsufficientContextError::missing(["target_market"]));
        }

        let roles = role_pool(input.business_model);
        let offset = axis_offset(input);

        let seeds = (0..count)
            .map(|i| {
                let axes = AxisTuple::from_index(offset + i);
                let business_buyer = input.business_model.sells_to_businesses();
                let company_size =
                    business_buyer.then(|| CUSTOMER_SIZES[(offset + i) % CUSTOMER_SIZES.len()]);
                PersonaSeed {
                    seed_id: format!("seed_{}", i + 1),
                    segment: segments[i % segments.len()].clone(),
                    role: roles[(offset + i) % roles.len()].to_string(),
                    industry: business_buyer.then(|| input.industry.trim().to_string()),
                    company_size,
                    business_model: input.business_model,
                    age_bracket: axes.age_bracket,
                    income_bracket: axes.income_bracket,
                    risk_tolerance: axes.risk_tolerance,
                    technology_adoption: axes.technology_adoption,
                }
            })
            .collect();

        Ok(seeds)
    }
}

/// Roles a persona may hold given how the company sells.
pub fn role_pool(business_model: BusinessModel) -> &'static [&'static str] {
    if business_model.sells_to_businesses() {
        &B2B_ROLES
    } else {
        &CONSUMER_ROLES
    }
}

/// Splits a target market description into candidate segments.
///
/// Lists such as "ops teams, finance teams and IT leads" yield one segment per
/// item. A description without list separators is a single segment. Blank
/// input yields no segments.
pub fn market_segments(target_market: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for piece in target_market.split([',', ';', '/', '&', '|']) {
        for part in piece.split(" and ") {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if !segments.iter().any(|s| s.eq_ignore_ascii_case(part)) {
                segments.push(part.to_string());
            }
        }
    }
    segments
}

/// Stable starting point in the axis space for this company.
fn axis_offset(input: &CompanyInput) -> usize {
    let mut hasher = Sha256::new();
    hasher.update(input.name.trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(input.industry.trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(input.target_market.trim().as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % AXIS_COMBINATIONS as u64) as usize
}
