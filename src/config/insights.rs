//! Aggregation configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::insights::AggregationSettings;

/// Insight aggregation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsConfig {
    /// Jaccard similarity needed to join an objection cluster
    #[serde(default = "default_similarity_threshold")]
    pub objection_similarity_threshold: f64,

    /// Personas needed before a reasoning pattern is reported
    #[serde(default = "default_min_pattern_frequency")]
    pub min_pattern_frequency: usize,

    #[serde(default = "default_include_reasoning_patterns")]
    pub include_reasoning_patterns: bool,

    /// Objection clusters kept in the report
    #[serde(default = "default_max_objections")]
    pub max_objections: usize,
}

impl InsightsConfig {
    pub fn aggregation_settings(&self) -> AggregationSettings {
        AggregationSettings {
            similarity_threshold: self.objection_similarity_threshold,
            min_pattern_frequency: self.min_pattern_frequency,
            include_reasoning_patterns: self.include_reasoning_patterns,
            max_objections: self.max_objections,
        }
    }

    /// Validate insights configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let threshold = self.objection_similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ValidationError::InvalidSimilarityThreshold);
        }
        if self.min_pattern_frequency == 0 {
            return Err(ValidationError::MustBePositive("insights.min_pattern_frequency"));
        }
        Ok(())
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            objection_similarity_threshold: default_similarity_threshold(),
            min_pattern_frequency: default_min_pattern_frequency(),
            include_reasoning_patterns: default_include_reasoning_patterns(),
            max_objections: default_max_objections(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_min_pattern_frequency() -> usize {
    2
}

fn default_include_reasoning_patterns() -> bool {
    true
}

fn default_max_objections() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_aggregator() {
        assert_eq!(
            InsightsConfig::default().aggregation_settings(),
            AggregationSettings::default()
        );
    }

    #[test]
    fn test_threshold_bounds() {
        for threshold in [0.0, -0.1, 1.5] {
            let config = InsightsConfig {
                objection_similarity_threshold: threshold,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ValidationError::InvalidSimilarityThreshold)
            );
        }
        let config = InsightsConfig {
            objection_similarity_threshold: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
