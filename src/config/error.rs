//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Retry max_attempts must be at least 1")]
    InvalidRetryAttempts,

    #[error("At least one {0} message is required")]
    EmptyMessages(&'static str),

    #[error("Unknown handoff reason in custom stalling messages: {0}")]
    UnknownHandoffReason(String),

    #[error("Invalid business hours: open {open}, close {close}, offset {offset}")]
    InvalidBusinessHours { open: u32, close: u32, offset: i32 },

    #[error("Roboticness threshold must be within 0.0..=1.0, got {0}")]
    InvalidRoboticnessThreshold(f64),

    #[error("History window must be at least 1")]
    InvalidHistoryWindow,

    #[error("Invalid detection thresholds: {0}")]
    InvalidThresholds(#[from] crate::domain::foundation::ValidationError),
}
