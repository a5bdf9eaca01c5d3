//! Handoff configuration

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::handoff::{HandoffReasonKind, StallingCatalog, FALLBACK_STALLING_MESSAGE};

use super::error::ValidationError;

/// Handoff lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HandoffConfig {
    /// Used for reason kinds with no templates at all
    #[serde(default = "default_stalling_messages")]
    pub stalling_messages: Vec<String>,

    /// Extra templates per reason kind, keyed by kind name
    /// (`ai_probing`, `COMPLEX_QUERY`, ...; case-insensitive)
    #[serde(default)]
    pub custom_stalling_messages: HashMap<String, Vec<String>>,

    /// Wait time promised to the customer, in seconds
    #[serde(default = "default_estimated_wait")]
    pub estimated_wait_secs: u64,

    /// How long a notified handoff may wait before it is re-sent as urgent
    #[serde(default = "default_max_wait")]
    pub max_wait_before_escalation_secs: u64,

    /// How often the overdue check runs
    #[serde(default = "default_check_interval")]
    pub escalation_check_interval_secs: u64,

    /// Operator webhook; alerts go to the log when unset
    pub webhook_url: Option<String>,

    /// Bearer token for the webhook
    pub webhook_token: Option<String>,
}

impl HandoffConfig {
    pub fn estimated_wait(&self) -> Duration {
        Duration::from_secs(self.estimated_wait_secs)
    }

    pub fn has_webhook(&self) -> bool {
        self.webhook_url.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// Builds the stalling catalog, rejecting unknown reason kinds.
    pub fn stalling_catalog(&self) -> Result<StallingCatalog, ValidationError> {
        let mut custom: HashMap<HandoffReasonKind, Vec<String>> = HashMap::new();
        for (key, messages) in &self.custom_stalling_messages {
            let kind = HandoffReasonKind::parse(key)
                .ok_or_else(|| ValidationError::UnknownHandoffReason(key.clone()))?;
            custom.entry(kind).or_default().extend(messages.iter().cloned());
        }
        Ok(StallingCatalog::new(self.stalling_messages.clone(), custom))
    }

    /// Validate handoff configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stalling_messages.iter().all(|m| m.trim().is_empty()) {
            return Err(ValidationError::EmptyMessages("handoff stalling"));
        }
        if self.escalation_check_interval_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.stalling_catalog()?;
        Ok(())
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            stalling_messages: default_stalling_messages(),
            custom_stalling_messages: HashMap::new(),
            estimated_wait_secs: default_estimated_wait(),
            max_wait_before_escalation_secs: default_max_wait(),
            escalation_check_interval_secs: default_check_interval(),
            webhook_url: None,
            webhook_token: None,
        }
    }
}

fn default_stalling_messages() -> Vec<String> {
    vec![FALLBACK_STALLING_MESSAGE.to_string()]
}

fn default_estimated_wait() -> u64 {
    300
}

fn default_max_wait() -> u64 {
    600
}

fn default_check_interval() -> u64 {
    60
}
