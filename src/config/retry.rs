//! Generation retry configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Generation attempts before escalating
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delay")]
    pub delay_between_retries_ms: u64,

    /// One per attempt; the last one is also the reply when all attempts fail
    #[serde(default = "default_stalling_messages")]
    pub stalling_messages: Vec<String>,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_retries_ms)
    }

    /// Stalling message for a failed attempt (1-based), clamped to the last one.
    pub fn stalling_message(&self, attempt: u32) -> &str {
        let index = (attempt.max(1) as usize - 1).min(self.stalling_messages.len().saturating_sub(1));
        self.stalling_messages
            .get(index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Reply sent when every attempt failed.
    pub fn final_stalling_message(&self) -> &str {
        self.stalling_messages
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidRetryAttempts);
        }
        if self.stalling_messages.iter().all(|m| m.trim().is_empty()) {
            return Err(ValidationError::EmptyMessages("retry stalling"));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_between_retries_ms: default_delay(),
            stalling_messages: default_stalling_messages(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay() -> u64 {
    2_000
}

fn default_stalling_messages() -> Vec<String> {
    vec![
        "Секунду, уточняю.".to_string(),
        "Ещё минутку, проверяю информацию.".to_string(),
        "Извините за задержку, передаю ваш вопрос коллеге, он скоро ответит.".to_string(),
    ]
}
