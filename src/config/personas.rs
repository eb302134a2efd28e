//! Persona panel configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::PersonaCountLimits;

/// Persona generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaConfig {
    /// Panel size when the caller does not ask for one
    #[serde(default = "default_count")]
    pub default_count: usize,

    #[serde(default = "default_min_count")]
    pub min_count: usize,

    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Enrichment calls in flight at once
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,
}

impl PersonaConfig {
    pub fn limits(&self) -> PersonaCountLimits {
        PersonaCountLimits {
            default_count: self.default_count,
            min_count: self.min_count,
            max_count: self.max_count,
        }
    }

    /// Validate persona configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ordered = 1 <= self.min_count
            && self.min_count <= self.default_count
            && self.default_count <= self.max_count;
        if !ordered {
            return Err(ValidationError::InvalidPersonaCounts {
                min: self.min_count,
                default: self.default_count,
                max: self.max_count,
            });
        }
        if self.enrichment_concurrency == 0 {
            return Err(ValidationError::MustBePositive("personas.enrichment_concurrency"));
        }
        Ok(())
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            min_count: default_min_count(),
            max_count: default_max_count(),
            enrichment_concurrency: default_enrichment_concurrency(),
        }
    }
}

fn default_count() -> usize {
    8
}

fn default_min_count() -> usize {
    5
}

fn default_max_count() -> usize {
    10
}

fn default_enrichment_concurrency() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PersonaConfig::default();
        assert_eq!(config.limits(), PersonaCountLimits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_outside_bounds_is_invalid() {
        let config = PersonaConfig {
            default_count: 12,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPersonaCounts { default: 12, .. })
        ));
    }

    #[test]
    fn test_zero_minimum_is_invalid() {
        let config = PersonaConfig {
            min_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
