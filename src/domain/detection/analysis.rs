//! Result types produced by the situation detector.

use serde::{Deserialize, Serialize};

use crate::domain::context::EmotionalState;
use crate::domain::handoff::HandoffReason;

/// Four-tier risk scale, shared by overall risk and emotional escalation risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Buckets a 0–100 score.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Representative 0–100 weight of the tier.
    pub fn weight(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.0,
            RiskLevel::Medium => 40.0,
            RiskLevel::High => 70.0,
            RiskLevel::Critical => 100.0,
        }
    }
}

/// How soon an operator should look at the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Low,
    Normal,
    High,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbingType {
    Direct,
    Indirect,
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbingRecommendation {
    AnswerNaturally,
    Deflect,
    Handoff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProbeDetection {
    pub detected: bool,
    /// 0.0–1.0.
    pub confidence: f64,
    /// Tier that produced the highest confidence.
    pub probing_type: Option<ProbingType>,
    pub patterns: Vec<String>,
    pub recommendation: ProbingRecommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityRecommendation {
    Answer,
    Clarify,
    Handoff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    /// 0–100.
    pub score: u32,
    pub factors: Vec<String>,
    /// Details the customer did not give but an exact answer would need.
    pub missing_info: Vec<String>,
    pub recommendation: ComplexityRecommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTrend {
    Escalated,
    Stable,
    Improved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalStateDetection {
    pub state: EmotionalState,
    /// Evidence weight of the winning category, capped at 1.0.
    pub confidence: f64,
    pub escalation_risk: RiskLevel,
    pub change_from_previous: EmotionalTrend,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceRecommendation {
    Send,
    Review,
    Handoff,
}

/// Components of the confidence score, each 0.0–1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub topic_match: f64,
    pub clarity: f64,
    pub hallucination_risk: f64,
    pub context_relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// 0–100.
    pub score: u32,
    pub factors: ConfidenceFactors,
    pub recommendation: ConfidenceRecommendation,
}

/// Outcome of a fixed phrase scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeywordDetection {
    pub detected: bool,
    pub matched_terms: Vec<String>,
}

impl KeywordDetection {
    pub fn from_terms(matched_terms: Vec<String>) -> Self {
        Self {
            detected: !matched_terms.is_empty(),
            matched_terms,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Comma-separated matched terms, for operator-facing descriptions.
    pub fn terms(&self) -> String {
        self.matched_terms.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BinaryDetections {
    pub prompt_injection: KeywordDetection,
    pub profanity: KeywordDetection,
    pub media_request: KeywordDetection,
    pub viewing_request: KeywordDetection,
    pub client_nearby: KeywordDetection,
    pub purchase_sale: KeywordDetection,
    pub sublease_long_term: KeywordDetection,
    pub office_customization: KeywordDetection,
}

/// Aggregate of every detector for one inbound message.
///
/// Recomputed per message. Only the emotional state outlives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationAnalysis {
    pub ai_probing: AiProbeDetection,
    pub complexity: ComplexityScore,
    pub emotional_state: EmotionalStateDetection,
    pub confidence: ConfidenceScore,
    pub flags: BinaryDetections,
    pub overall_risk: RiskLevel,
    pub urgency: Urgency,
    pub requires_handoff: bool,
    pub handoff_reason: Option<HandoffReason>,
}
