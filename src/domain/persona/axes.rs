//! Diversity axes used to force heterogeneity across a persona set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Age range a persona falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55-64")]
    From55To64,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::From18To24,
        AgeBracket::From25To34,
        AgeBracket::From35To44,
        AgeBracket::From45To54,
        AgeBracket::From55To64,
    ];

    /// Inclusive age bounds of the bracket.
    pub fn bounds(&self) -> (u8, u8) {
        match self {
            AgeBracket::From18To24 => (18, 24),
            AgeBracket::From25To34 => (25, 34),
            AgeBracket::From35To44 => (35, 44),
            AgeBracket::From45To54 => (45, 54),
            AgeBracket::From55To64 => (55, 64),
        }
    }

    /// Returns true if the given age falls inside the bracket.
    pub fn contains(&self, age: u8) -> bool {
        let (low, high) = self.bounds();
        (low..=high).contains(&age)
    }

    /// Age used when nothing better is known.
    pub fn midpoint(&self) -> u8 {
        let (low, high) = self.bounds();
        low + (high - low) / 2
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From18To24 => "18-24",
            AgeBracket::From25To34 => "25-34",
            AgeBracket::From35To44 => "35-44",
            AgeBracket::From45To54 => "45-54",
            AgeBracket::From55To64 => "55-64",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Annual income band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncomeBracket {
    #[serde(rename = "$30K-$50K")]
    From30KTo50K,
    #[serde(rename = "$50K-$75K")]
    From50KTo75K,
    #[serde(rename = "$75K-$100K")]
    From75KTo100K,
    #[serde(rename = "$100K-$150K")]
    From100KTo150K,
    #[serde(rename = "$150K-$200K")]
    From150KTo200K,
    #[serde(rename = "$200K+")]
    Above200K,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 6] = [
        IncomeBracket::From30KTo50K,
        IncomeBracket::From50KTo75K,
        IncomeBracket::From75KTo100K,
        IncomeBracket::From100KTo150K,
        IncomeBracket::From150KTo200K,
        IncomeBracket::Above200K,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IncomeBracket::From30KTo50K => "$30K-$50K",
            IncomeBracket::From50KTo75K => "$50K-$75K",
            IncomeBracket::From75KTo100K => "$75K-$100K",
            IncomeBracket::From100KTo150K => "$100K-$150K",
            IncomeBracket::From150KTo200K => "$150K-$200K",
            IncomeBracket::Above200K => "$200K+",
        }
    }
}

impl fmt::Display for IncomeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Appetite for risk when evaluating new products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTolerance {
    High,
    Medium,
    Low,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [RiskTolerance::High, RiskTolerance::Medium, RiskTolerance::Low];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTolerance::High => "High",
            RiskTolerance::Medium => "Medium",
            RiskTolerance::Low => "Low",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position on the technology adoption curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechnologyAdoption {
    #[serde(rename = "Early Adopter")]
    EarlyAdopter,
    #[serde(rename = "Early Majority")]
    EarlyMajority,
    #[serde(rename = "Late Majority")]
    LateMajority,
    Laggard,
}

impl TechnologyAdoption {
    pub const ALL: [TechnologyAdoption; 4] = [
        TechnologyAdoption::EarlyAdopter,
        TechnologyAdoption::EarlyMajority,
        TechnologyAdoption::LateMajority,
        TechnologyAdoption::Laggard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TechnologyAdoption::EarlyAdopter => "Early Adopter",
            TechnologyAdoption::EarlyMajority => "Early Majority",
            TechnologyAdoption::LateMajority => "Late Majority",
            TechnologyAdoption::Laggard => "Laggard",
        }
    }
}

impl fmt::Display for TechnologyAdoption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of distinct axis tuples; seeds are unique up to this count.
pub const AXIS_COMBINATIONS: usize = AgeBracket::ALL.len()
    * IncomeBracket::ALL.len()
    * RiskTolerance::ALL.len()
    * TechnologyAdoption::ALL.len();

/// One value on each diversity axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxisTuple {
    pub age_bracket: AgeBracket,
    pub income_bracket: IncomeBracket,
    pub risk_tolerance: RiskTolerance,
    pub technology_adoption: TechnologyAdoption,
}

impl AxisTuple {
    /// Maps `index` onto the axis space.
    ///
    /// Age, risk and adoption cardinalities (5, 3, 4) are pairwise coprime, so
    /// `index % 60` fixes those three axes. The income axis is shifted by the
    /// block number `index / 60`, which makes the map a bijection on
    /// `0..AXIS_COMBINATIONS`. Indices beyond that wrap around.
    pub fn from_index(index: usize) -> Self {
        let index = index % AXIS_COMBINATIONS;
        let block = index / 60;
        Self {
            age_bracket: AgeBracket::ALL[index % AgeBracket::ALL.len()],
            income_bracket: IncomeBracket::ALL[(index + block) % IncomeBracket::ALL.len()],
            risk_tolerance: RiskTolerance::ALL[index % RiskTolerance::ALL.len()],
            technology_adoption: TechnologyAdoption::ALL[index % TechnologyAdoption::ALL.len()],
        }
    }
}
