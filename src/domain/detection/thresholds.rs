//! Tunable thresholds for the situation detector.

use serde::{Deserialize, Serialize};

use crate::domain::context::EmotionalState;
use crate::domain::foundation::ValidationError;

/// AI-probing thresholds, both on the 0.0–1.0 confidence scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiProbingThresholds {
    /// Confidence at which probing counts as detected.
    pub min_confidence: f64,
    pub handoff_threshold: f64,
}

impl Default for AiProbingThresholds {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            handoff_threshold: 0.8,
        }
    }
}

/// Complexity thresholds on the 0–100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityThresholds {
    /// Scores below this are answered directly.
    pub max_score: u32,
    pub handoff_threshold: u32,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            max_score: 50,
            handoff_threshold: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionalThresholds {
    /// Minimum detector confidence for a mood-driven handoff.
    pub escalation_threshold: f64,
    pub handoff_states: Vec<EmotionalState>,
}

impl Default for EmotionalThresholds {
    fn default() -> Self {
        Self {
            escalation_threshold: 0.6,
            handoff_states: vec![EmotionalState::Angry],
        }
    }
}

/// Confidence thresholds on the 0–100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    /// At or above this a draft is sent as is.
    pub min_score: u32,
    /// Below this the conversation is handed off.
    pub handoff_threshold: u32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            min_score: 70,
            handoff_threshold: 40,
        }
    }
}

/// Everything the detector needs besides the message and context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    pub ai_probing: AiProbingThresholds,
    pub complexity: ComplexityThresholds,
    pub emotional: EmotionalThresholds,
    pub confidence: ConfidenceThresholds,
}

impl DetectionThresholds {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let unit = |field: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ValidationError::invalid_format(
                    field,
                    format!("must be within 0.0..=1.0, got {}", v),
                ))
            }
        };
        let percent = |field: &str, v: u32| {
            if v <= 100 {
                Ok(())
            } else {
                Err(ValidationError::out_of_range(field, 0, 100, v as i32))
            }
        };

        unit("ai_probing.min_confidence", self.ai_probing.min_confidence)?;
        unit("ai_probing.handoff_threshold", self.ai_probing.handoff_threshold)?;
        if self.ai_probing.handoff_threshold < self.ai_probing.min_confidence {
            return Err(ValidationError::invalid_format(
                "ai_probing.handoff_threshold",
                "must not be below min_confidence",
            ));
        }

        percent("complexity.max_score", self.complexity.max_score)?;
        percent("complexity.handoff_threshold", self.complexity.handoff_threshold)?;
        if self.complexity.handoff_threshold < self.complexity.max_score {
            return Err(ValidationError::invalid_format(
                "complexity.handoff_threshold",
                "must not be below max_score",
            ));
        }

        unit("emotional.escalation_threshold", self.emotional.escalation_threshold)?;

        percent("confidence.min_score", self.confidence.min_score)?;
        percent("confidence.handoff_threshold", self.confidence.handoff_threshold)?;
        if self.confidence.handoff_threshold > self.confidence.min_score {
            return Err(ValidationError::invalid_format(
                "confidence.handoff_threshold",
                "must not exceed min_score",
            ));
        }
        Ok(())
    }
}
