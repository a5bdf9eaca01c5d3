//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `OFFICE_CONCIERGE` prefix and nested values use double underscores as separators.
//! A YAML file named by `OFFICE_CONCIERGE_CONFIG` is read first when set; the
//! environment overrides it.
//!
//! # Example
//!
//! ```no_run
//! use office_concierge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod context;
mod error;
mod handoff;
mod orchestrator;
mod retry;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use context::ContextConfig;
pub use error::{ConfigError, ValidationError};
pub use handoff::HandoffConfig;
pub use orchestrator::{BusinessHoursConfig, OrchestratorConfig};
pub use retry::RetryConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

use crate::domain::detection::DetectionThresholds;

/// Environment variable naming an optional YAML configuration file.
pub const CONFIG_FILE_ENV: &str = "OFFICE_CONCIERGE_CONFIG";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// configuration backed by the mock AI engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI engine configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Situation detector thresholds
    #[serde(default)]
    pub detection: DetectionThresholds,

    /// Handoff lifecycle and operator notification
    #[serde(default)]
    pub handoff: HandoffConfig,

    /// Generation retries
    #[serde(default)]
    pub retry: RetryConfig,

    /// Conversation context store
    #[serde(default)]
    pub context: ContextConfig,

    /// Per-message pipeline
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl AppConfig {
    /// Load configuration from an optional YAML file and the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the YAML file named by `OFFICE_CONCIERGE_CONFIG`, if set
    /// 3. Reads environment variables with `OFFICE_CONCIERGE` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `OFFICE_CONCIERGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `OFFICE_CONCIERGE__RETRY__MAX_ATTEMPTS=3` -> `retry.max_attempts = 3`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or values cannot be
    /// parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("OFFICE_CONCIERGE")
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
    /// Returns `ValidationError` for the first section that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.detection.validate()?;
        self.handoff.validate()?;
        self.retry.validate()?;
        self.context.validate()?;
        self.orchestrator.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
