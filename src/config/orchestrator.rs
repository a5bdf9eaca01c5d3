//! Orchestrator configuration: persona, timings, and fixed replies.

use chrono::Weekday;
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::dialogue::FixedBusinessHours;
use crate::ports::Personality;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub personality: Personality,

    /// Delay before the answer that follows a greeting
    #[serde(default = "default_greeting_delay")]
    pub greeting_delay_ms: u64,

    /// Off-topic messages tolerated before escalating
    #[serde(default = "default_max_off_topic")]
    pub max_off_topic_offenses: u32,

    /// Replies scoring above this get one more styling pass
    #[serde(default = "default_roboticness_threshold")]
    pub roboticness_threshold: f64,

    /// Knowledge items retrieved per message, office listings excluded
    #[serde(default = "default_knowledge_limit")]
    pub knowledge_limit: usize,

    /// YAML knowledge file; the knowledge base is empty when unset
    pub knowledge_path: Option<String>,

    /// Silence after which the customer is nudged, in seconds
    #[serde(default = "default_follow_up_delay")]
    pub follow_up_delay_secs: u64,

    #[serde(default = "default_follow_up_message")]
    pub follow_up_message: String,

    /// Apology sent with a technical-issue handoff
    #[serde(default = "default_technical_issue_message")]
    pub technical_issue_message: String,

    /// Last-resort reply when even the handoff failed
    #[serde(default = "default_degraded_message")]
    pub degraded_message: String,

    /// Acknowledgement for partners, vendors and other flagged contacts
    /// when the generator is unavailable
    #[serde(default = "default_flagged_contact_message")]
    pub flagged_contact_message: String,

    /// Phrases in a generated reply that announce a handoff
    #[serde(default = "default_handoff_phrases")]
    pub handoff_phrases: Vec<String>,

    #[serde(default)]
    pub business_hours: BusinessHoursConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessHoursConfig {
    /// Off-hours auto-reply is disabled when false
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,

    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    #[serde(default = "default_close_hour")]
    pub close_hour: u32,

    /// Days as `mon`..`sun`
    #[serde(default = "default_working_days")]
    pub working_days: Vec<String>,

    pub message: Option<String>,
}

impl OrchestratorConfig {
    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_secs(self.follow_up_delay_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.roboticness_threshold) {
            return Err(ValidationError::InvalidRoboticnessThreshold(
                self.roboticness_threshold,
            ));
        }
        if self.technical_issue_message.trim().is_empty() || self.degraded_message.trim().is_empty() {
            return Err(ValidationError::EmptyMessages("fallback"));
        }
        self.business_hours.validate()?;
        Ok(())
    }
}

impl BusinessHoursConfig {
    /// The configured schedule, or `None` when the gate is disabled.
    pub fn to_business_hours(&self) -> Option<FixedBusinessHours> {
        if !self.enabled {
            return None;
        }
        let defaults = FixedBusinessHours::default();
        Some(FixedBusinessHours {
            utc_offset_hours: self.utc_offset_hours,
            open_hour: self.open_hour,
            close_hour: self.close_hour,
            working_days: self
                .working_days
                .iter()
                .filter_map(|d| d.parse::<Weekday>().ok())
                .collect(),
            message: self.message.clone().unwrap_or(defaults.message),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidBusinessHours {
            open: self.open_hour,
            close: self.close_hour,
            offset: self.utc_offset_hours,
        };
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(invalid());
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(invalid());
        }
        if self.working_days.iter().any(|d| d.parse::<Weekday>().is_err()) {
            return Err(invalid());
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            personality: Personality::default(),
            greeting_delay_ms: default_greeting_delay(),
            max_off_topic_offenses: default_max_off_topic(),
            roboticness_threshold: default_roboticness_threshold(),
            knowledge_limit: default_knowledge_limit(),
            knowledge_path: None,
            follow_up_delay_secs: default_follow_up_delay(),
            follow_up_message: default_follow_up_message(),
            technical_issue_message: default_technical_issue_message(),
            degraded_message: default_degraded_message(),
            flagged_contact_message: default_flagged_contact_message(),
            handoff_phrases: default_handoff_phrases(),
            business_hours: BusinessHoursConfig::default(),
        }
    }
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            utc_offset_hours: default_utc_offset(),
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            working_days: default_working_days(),
            message: None,
        }
    }
}

fn default_greeting_delay() -> u64 {
    1_500
}

fn default_max_off_topic() -> u32 {
    2
}

fn default_roboticness_threshold() -> f64 {
    0.5
}

fn default_knowledge_limit() -> usize {
    5
}

fn default_follow_up_delay() -> u64 {
    30 * 60
}

fn default_follow_up_message() -> String {
    "Если появятся вопросы по офисам, пишите, я на связи.".to_string()
}

fn default_technical_issue_message() -> String {
    "Извините, у нас небольшая техническая заминка. Передаю ваш вопрос коллеге, он скоро ответит."
        .to_string()
}

fn default_degraded_message() -> String {
    "Извините, сейчас не получается ответить. Напишите, пожалуйста, чуть позже.".to_string()
}

fn default_flagged_contact_message() -> String {
    "Спасибо за сообщение! Передам его ответственному коллеге.".to_string()
}

fn default_handoff_phrases() -> Vec<String> {
    [
        "передам менеджеру",
        "передаю менеджеру",
        "передам ваш вопрос",
        "подключу менеджера",
        "позову менеджера",
        "соединю с менеджером",
        "свяжется с вами менеджер",
        "менеджер свяжется",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_utc_offset() -> i32 {
    3
}

fn default_open_hour() -> u32 {
    9
}

fn default_close_hour() -> u32 {
    21
}

fn default_working_days() -> Vec<String> {
    ["mon", "tue", "wed", "thu", "fri", "sat"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
