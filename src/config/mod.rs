//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERSONA_SIM` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a runnable
//! offline configuration.
//!
//! # Example
//!
//! ```no_run
//! use persona_sim::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Simulating with {} concurrent calls", config.simulation.max_concurrency);
//! ```

mod ai;
mod error;
mod insights;
mod personas;
mod simulation;
mod telemetry;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use insights::InsightsConfig;
pub use personas::PersonaConfig;
pub use simulation::SimulationConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (mock/OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Simulation batch configuration (concurrency, chunking, retries)
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Persona panel configuration
    #[serde(default)]
    pub personas: PersonaConfig,

    /// Insight aggregation configuration
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PERSONA_SIM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PERSONA_SIM__SIMULATION__MAX_CONCURRENCY=8` -> `simulation.max_concurrency = 8`
    /// - `PERSONA_SIM__AI__PROVIDER=openai` -> `ai.provider = OpenAI`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERSONA_SIM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.simulation.validate()?;
        self.personas.validate()?;
        self.insights.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "PERSONA_SIM__AI__PROVIDER",
        "PERSONA_SIM__AI__OPENAI_API_KEY",
        "PERSONA_SIM__SIMULATION__MAX_CONCURRENCY",
        "PERSONA_SIM__PERSONAS__DEFAULT_COUNT",
        "PERSONA_SIM__INSIGHTS__OBJECTION_SIMILARITY_THRESHOLD",
        "PERSONA_SIM__TELEMETRY__JSON",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert_eq!(config.personas.default_count, 8);
        assert_eq!(config.simulation.max_concurrency, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_SIM__SIMULATION__MAX_CONCURRENCY", "12");
        env::set_var("PERSONA_SIM__PERSONAS__DEFAULT_COUNT", "6");
        env::set_var("PERSONA_SIM__INSIGHTS__OBJECTION_SIMILARITY_THRESHOLD", "0.4");
        env::set_var("PERSONA_SIM__TELEMETRY__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.simulation.max_concurrency, 12);
        assert_eq!(config.personas.default_count, 6);
        assert!((config.insights.objection_similarity_threshold - 0.4).abs() < 1e-9);
        assert!(config.telemetry.json);
    }

    #[test]
    fn test_openai_without_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_SIM__AI__PROVIDER", "openai");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::OpenAI);
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        );
    }

    #[test]
    fn test_openai_with_key_is_valid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_SIM__AI__PROVIDER", "openai");
        env::set_var("PERSONA_SIM__AI__OPENAI_API_KEY", "sk-test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.ai.has_openai());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
