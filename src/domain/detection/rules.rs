//! Ordered handoff rules.
//!
//! Evaluated top to bottom; the first rule whose predicate holds supplies the
//! handoff reason. Unambiguous high-risk signals come first so a low
//! confidence verdict can never mask them.

use crate::domain::handoff::{HandoffReason, HandoffReasonKind, Severity};

use super::analysis::{RiskLevel, SituationAnalysis};
use super::thresholds::DetectionThresholds;

/// One entry of the escalation cascade.
pub struct HandoffRule {
    /// Also recorded as `detected_by` on the reason.
    pub name: &'static str,
    pub applies: fn(&SituationAnalysis, &DetectionThresholds) -> bool,
    pub reason: fn(&SituationAnalysis) -> HandoffReason,
}

impl std::fmt::Debug for HandoffRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffRule").field("name", &self.name).finish()
    }
}

pub static HANDOFF_RULES: &[HandoffRule] = &[
    HandoffRule {
        name: "profanity",
        applies: |a, _| a.flags.profanity.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::Profanity,
                format!("Profanity detected: {}", a.flags.profanity.terms()),
                Severity::High,
                "profanity",
            )
        },
    },
    HandoffRule {
        name: "media_request",
        applies: |a, _| a.flags.media_request.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::MediaRequest,
                format!("Customer asked for photos or video: {}", a.flags.media_request.terms()),
                Severity::Medium,
                "media_request",
            )
        },
    },
    HandoffRule {
        name: "prompt_injection",
        applies: |a, _| a.flags.prompt_injection.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::PromptInjection,
                format!("Prompt injection attempt: {}", a.flags.prompt_injection.terms()),
                Severity::High,
                "prompt_injection",
            )
        },
    },
    HandoffRule {
        name: "client_nearby",
        applies: |a, _| a.flags.client_nearby.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::ClientNearby,
                format!("Client is at or near the office: {}", a.flags.client_nearby.terms()),
                Severity::Critical,
                "client_nearby",
            )
        },
    },
    HandoffRule {
        name: "purchase_sale",
        applies: |a, _| a.flags.purchase_sale.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::PurchaseSale,
                format!("Purchase or sale inquiry: {}", a.flags.purchase_sale.terms()),
                Severity::Medium,
                "purchase_sale",
            )
        },
    },
    HandoffRule {
        name: "viewing_request",
        applies: |a, _| a.flags.viewing_request.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::ViewingRequest,
                format!("Viewing requested: {}", a.flags.viewing_request.terms()),
                Severity::Medium,
                "viewing_request",
            )
        },
    },
    HandoffRule {
        name: "sublease_long_term",
        applies: |a, _| a.flags.sublease_long_term.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::SubleaseLongTerm,
                format!("Sublease or long-term lease: {}", a.flags.sublease_long_term.terms()),
                Severity::Medium,
                "sublease_long_term",
            )
        },
    },
    HandoffRule {
        name: "office_customization",
        applies: |a, _| a.flags.office_customization.detected,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::OfficeCustomization,
                format!(
                    "Office customization request: {}",
                    a.flags.office_customization.terms()
                ),
                Severity::Low,
                "office_customization",
            )
        },
    },
    HandoffRule {
        name: "ai_probing",
        applies: |a, t| a.ai_probing.confidence >= t.ai_probing.handoff_threshold,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::AiProbing,
                format!(
                    "Customer is probing for a bot (confidence {:.2}): {}",
                    a.ai_probing.confidence,
                    a.ai_probing.patterns.join(", ")
                ),
                Severity::High,
                "ai_probing",
            )
        },
    },
    HandoffRule {
        name: "complexity",
        applies: |a, t| a.complexity.score >= t.complexity.handoff_threshold,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::ComplexQuery,
                format!(
                    "Complex request (score {}): {}",
                    a.complexity.score,
                    a.complexity.factors.join("; ")
                ),
                Severity::Medium,
                "complexity",
            )
        },
    },
    HandoffRule {
        name: "emotional_state",
        applies: |a, t| {
            t.emotional.handoff_states.contains(&a.emotional_state.state)
                && a.emotional_state.confidence >= t.emotional.escalation_threshold
        },
        reason: |a| {
            let severity = if a.emotional_state.escalation_risk == RiskLevel::Critical {
                Severity::Critical
            } else {
                Severity::High
            };
            HandoffReason::new(
                HandoffReasonKind::EmotionalEscalation,
                format!(
                    "Customer is {} (confidence {:.2}): {}",
                    a.emotional_state.state,
                    a.emotional_state.confidence,
                    a.emotional_state.indicators.join(", ")
                ),
                severity,
                "emotional_state",
            )
        },
    },
    HandoffRule {
        name: "confidence",
        applies: |a, t| a.confidence.score < t.confidence.handoff_threshold,
        reason: |a| {
            HandoffReason::new(
                HandoffReasonKind::LowConfidence,
                format!("Answer confidence too low ({})", a.confidence.score),
                Severity::Low,
                "confidence",
            )
        },
    },
];

/// First rule that fires, if any.
pub fn first_matching(
    analysis: &SituationAnalysis,
    thresholds: &DetectionThresholds,
) -> Option<&'static HandoffRule> {
    HANDOFF_RULES
        .iter()
        .find(|rule| (rule.applies)(analysis, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::EmotionalState;
    use crate::domain::detection::analysis::*;

    fn quiet() -> SituationAnalysis {
        SituationAnalysis {
            ai_probing: AiProbeDetection {
                detected: false,
                confidence: 0.0,
                probing_type: None,
                patterns: vec![],
                recommendation: ProbingRecommendation::AnswerNaturally,
            },
            complexity: ComplexityScore {
                score: 0,
                factors: vec![],
                missing_info: vec![],
                recommendation: ComplexityRecommendation::Answer,
            },
            emotional_state: EmotionalStateDetection {
                state: EmotionalState::Neutral,
                confidence: 0.0,
                escalation_risk: RiskLevel::Low,
                change_from_previous: EmotionalTrend::Stable,
                indicators: vec![],
            },
            confidence: ConfidenceScore {
                score: 90,
                factors: ConfidenceFactors {
                    topic_match: 1.0,
                    clarity: 1.0,
                    hallucination_risk: 0.0,
                    context_relevance: 1.0,
                },
                recommendation: ConfidenceRecommendation::Send,
            },
            flags: BinaryDetections::default(),
            overall_risk: RiskLevel::Low,
            urgency: Urgency::Low,
            requires_handoff: false,
            handoff_reason: None,
        }
    }

    fn hit(term: &str) -> KeywordDetection {
        KeywordDetection::from_terms(vec![term.to_string()])
    }

    fn winner(a: &SituationAnalysis) -> Option<&'static str> {
        first_matching(a, &DetectionThresholds::default()).map(|r| r.name)
    }

    #[test]
    fn quiet_analysis_matches_nothing() {
        assert_eq!(winner(&quiet()), None);
    }

    #[test]
    fn order_is_fixed() {
        let names: Vec<_> = HANDOFF_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "profanity",
                "media_request",
                "prompt_injection",
                "client_nearby",
                "purchase_sale",
                "viewing_request",
                "sublease_long_term",
                "office_customization",
                "ai_probing",
                "complexity",
                "emotional_state",
                "confidence",
            ]
        );
    }

    #[test]
    fn profanity_beats_low_confidence_and_probing() {
        let mut a = quiet();
        a.confidence.score = 5;
        a.ai_probing.confidence = 1.0;
        a.flags.profanity = hit("сука");
        assert_eq!(winner(&a), Some("profanity"));

        let reason = (first_matching(&a, &DetectionThresholds::default()).unwrap().reason)(&a);
        assert_eq!(reason.kind, HandoffReasonKind::Profanity);
        assert_eq!(reason.severity, Severity::High);
        assert_eq!(reason.detected_by, "profanity");
    }

    #[test]
    fn client_nearby_beats_viewing_request() {
        let mut a = quiet();
        a.flags.viewing_request = hit("просмотр");
        a.flags.client_nearby = hit("я внизу");
        assert_eq!(winner(&a), Some("client_nearby"));
    }

    #[test]
    fn emotional_rule_needs_state_and_confidence() {
        let mut a = quiet();
        a.emotional_state.state = EmotionalState::Angry;
        a.emotional_state.confidence = 0.3;
        assert_eq!(winner(&a), None);

        a.emotional_state.confidence = 0.6;
        assert_eq!(winner(&a), Some("emotional_state"));

        a.emotional_state.state = EmotionalState::Frustrated;
        assert_eq!(winner(&a), None);
    }

    #[test]
    fn low_confidence_is_last_resort() {
        let mut a = quiet();
        a.confidence.score = 39;
        assert_eq!(winner(&a), Some("confidence"));
        a.complexity.score = 70;
        assert_eq!(winner(&a), Some("complexity"));
    }
}
