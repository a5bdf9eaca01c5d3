//! Situation detection: deterministic, threshold-based scoring of an inbound
//! message in the context of its conversation.
//!
//! Detectors never fail and never mutate the context. The aggregate verdict
//! (`requires_handoff`, `handoff_reason`) comes from the ordered rule list in
//! [`rules`].

mod analysis;
mod complexity;
mod confidence;
mod detector;
mod emotion;
mod flags;
pub mod lexicon;
mod probing;
pub mod rules;
mod thresholds;

pub use analysis::{
    AiProbeDetection, BinaryDetections, ComplexityRecommendation, ComplexityScore,
    ConfidenceFactors, ConfidenceRecommendation, ConfidenceScore, EmotionalStateDetection,
    EmotionalTrend, KeywordDetection, ProbingRecommendation, ProbingType, RiskLevel,
    SituationAnalysis, Urgency,
};
pub use complexity::score_complexity;
pub use confidence::score_confidence;
pub use detector::SituationDetector;
pub use emotion::detect_emotional_state;
pub use flags::{
    detect_all, detect_client_nearby, detect_media_request, detect_office_customization,
    detect_profanity, detect_prompt_injection, detect_purchase_sale, detect_sublease_long_term,
    detect_viewing_request,
};
pub use probing::detect_ai_probing;
pub use thresholds::{
    AiProbingThresholds, ComplexityThresholds, ConfidenceThresholds, DetectionThresholds,
    EmotionalThresholds,
};
