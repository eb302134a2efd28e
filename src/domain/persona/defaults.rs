//! Axis-consistent defaults used to backfill personas the model could not
//! fully enrich.
//!
//! Every default is chosen from the seed's fixed axis values, so a backfilled
//! field never contradicts the persona's age, income, risk tolerance or
//! adoption stage. Choices are deterministic per seed.

use super::axes::{IncomeBracket, RiskTolerance, TechnologyAdoption};
use super::seed::PersonaSeed;
use crate::domain::company::CompanySize;

const FIRST_NAMES: [&str; 12] = [
    "Alex", "Jordan", "Taylor", "Morgan", "Casey", "Riley", "Avery", "Quinn", "Sage", "River",
    "Phoenix", "Rowan",
];

const LAST_NAMES: [&str; 12] = [
    "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez", "Martinez",
    "Hernandez", "Lopez", "Gonzalez",
];

const TRAITS: [&str; 10] = [
    "Analytical",
    "Creative",
    "Detail-oriented",
    "Big-picture thinker",
    "Risk-averse",
    "Innovative",
    "Collaborative",
    "Independent",
    "Results-driven",
    "Process-oriented",
];

const VALUES: [&str; 10] = [
    "Efficiency",
    "Innovation",
    "Reliability",
    "Cost-effectiveness",
    "User experience",
    "Security",
    "Scalability",
    "Simplicity",
    "Quality",
    "Speed",
];

const MOTIVATIONS: [&str; 10] = [
    "Career advancement",
    "Problem solving",
    "Cost reduction",
    "Competitive advantage",
    "User satisfaction",
    "Process improvement",
    "Risk mitigation",
    "Growth",
    "Recognition",
    "Learning",
];

const PAIN_POINTS: [&str; 10] = [
    "Limited budget",
    "Time constraints",
    "Technical complexity",
    "Integration challenges",
    "Training requirements",
    "Security concerns",
    "Scalability issues",
    "Vendor lock-in",
    "Change resistance",
    "ROI uncertainty",
];

/// Deterministic defaults for one seed.
pub struct AxisDefaults<'a> {
    seed: &'a PersonaSeed,
    variant: usize,
}

impl<'a> AxisDefaults<'a> {
    pub fn for_seed(seed: &'a PersonaSeed) -> Self {
        let variant = seed
            .seed_id
            .bytes()
            .chain(seed.role.bytes())
            .fold(17usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        Self { seed, variant }
    }

    pub fn name(&self) -> String {
        format!(
            "{} {}",
            FIRST_NAMES[self.variant % FIRST_NAMES.len()],
            LAST_NAMES[(self.variant / FIRST_NAMES.len()) % LAST_NAMES.len()]
        )
    }

    /// An age inside the seed's bracket.
    pub fn age(&self) -> u8 {
        let (low, high) = self.seed.age_bracket.bounds();
        let span = usize::from(high - low) + 1;
        low + (self.variant % span) as u8
    }

    pub fn traits(&self) -> Vec<String> {
        let anchor = match self.seed.risk_tolerance {
            RiskTolerance::High => "Innovative",
            RiskTolerance::Medium => "Analytical",
            RiskTolerance::Low => "Risk-averse",
        };
        with_anchor(anchor, &TRAITS, self.variant, 3)
    }

    pub fn values(&self) -> Vec<String> {
        let anchor = match self.seed.technology_adoption {
            TechnologyAdoption::EarlyAdopter => "Innovation",
            TechnologyAdoption::EarlyMajority => "Efficiency",
            TechnologyAdoption::LateMajority => "Reliability",
            TechnologyAdoption::Laggard => "Simplicity",
        };
        with_anchor(anchor, &VALUES, self.variant, 2)
    }

    pub fn motivations(&self) -> Vec<String> {
        let anchor = match self.seed.risk_tolerance {
            RiskTolerance::High => "Competitive advantage",
            RiskTolerance::Medium => "Process improvement",
            RiskTolerance::Low => "Risk mitigation",
        };
        with_anchor(anchor, &MOTIVATIONS, self.variant, 2)
    }

    pub fn pain_points(&self) -> Vec<String> {
        let anchor = match self.seed.technology_adoption {
            TechnologyAdoption::EarlyAdopter => "Integration challenges",
            TechnologyAdoption::EarlyMajority => "Time constraints",
            TechnologyAdoption::LateMajority => "Training requirements",
            TechnologyAdoption::Laggard => "Change resistance",
        };
        with_anchor(anchor, &PAIN_POINTS, self.variant, 2)
    }

    pub fn decision_making_style(&self) -> String {
        match self.seed.risk_tolerance {
            RiskTolerance::High => "Quick decisive action",
            RiskTolerance::Medium => "Data-driven analysis",
            RiskTolerance::Low => "Extensive research",
        }
        .to_string()
    }

    pub fn information_sources(&self) -> Vec<String> {
        let sources: [&str; 2] = match self.seed.technology_adoption {
            TechnologyAdoption::EarlyAdopter => ["Conference presentations", "Social media"],
            TechnologyAdoption::EarlyMajority => ["Industry publications", "Peer networks"],
            TechnologyAdoption::LateMajority => ["Peer networks", "Online reviews"],
            TechnologyAdoption::Laggard => ["Consultant recommendations", "Vendor demos"],
        };
        sources.iter().map(|s| s.to_string()).collect()
    }

    pub fn current_solutions(&self) -> Vec<String> {
        let solution = match self.seed.technology_adoption {
            TechnologyAdoption::EarlyAdopter => "Competitor product",
            TechnologyAdoption::EarlyMajority => "Custom-built solution",
            TechnologyAdoption::LateMajority => "Spreadsheets",
            TechnologyAdoption::Laggard => "Legacy system",
        };
        vec![solution.to_string(), "Manual processes".to_string()]
    }

    pub fn budget(&self) -> String {
        match self.seed.income_bracket {
            IncomeBracket::From30KTo50K => "Very limited (<$1K)",
            IncomeBracket::From50KTo75K | IncomeBracket::From75KTo100K => "Small ($1K-$10K)",
            IncomeBracket::From100KTo150K => "Moderate ($10K-$50K)",
            IncomeBracket::From150KTo200K => "Substantial ($50K-$200K)",
            IncomeBracket::Above200K => "Large (>$200K)",
        }
        .to_string()
    }

    pub fn time_constraints(&self) -> String {
        match self.seed.risk_tolerance {
            RiskTolerance::High => "Immediate need",
            RiskTolerance::Medium => "Within 3 months",
            RiskTolerance::Low => "Annual planning cycle",
        }
        .to_string()
    }

    pub fn team_influence(&self) -> String {
        match self.seed.company_size {
            None => "Individual decision",
            Some(CompanySize::Startup) => "Team consensus required",
            Some(CompanySize::Smb) => "Manager approval needed",
            Some(CompanySize::MidMarket) => "Budget holder sign-off",
            Some(CompanySize::Enterprise) => "Committee decision",
        }
        .to_string()
    }
}

/// `anchor` followed by `extra` distinct pool entries chosen by `variant`.
fn with_anchor(anchor: &str, pool: &[&str], variant: usize, extra: usize) -> Vec<String> {
    let mut picked = vec![anchor.to_string()];
    let mut index = variant;
    while picked.len() < extra + 1 {
        let candidate = pool[index % pool.len()];
        if !picked.iter().any(|p| p == candidate) {
            picked.push(candidate.to_string());
        }
        index += 1;
    }
    picked
}
