//! Evidence-weighted mood detection.

use crate::domain::context::{ConversationContext, EmotionalState};

use super::analysis::{EmotionalStateDetection, EmotionalTrend, RiskLevel};
use super::lexicon::{
    self, ANGRY_EMOJI, ANGRY_KEYWORDS, CAPS_RUN, FRUSTRATED_EMOJI, FRUSTRATED_KEYWORDS,
    POSITIVE_EMOJI, POSITIVE_KEYWORDS,
};

const KEYWORD_WEIGHT: f64 = 0.3;
const CAPS_WEIGHT: f64 = 0.3;
const PUNCTUATION_WEIGHT: f64 = 0.3;
const EMOJI_WEIGHT: f64 = 0.2;
/// A category must score strictly above this to win.
const MIN_EVIDENCE: f64 = 0.2;

#[derive(Debug, Default)]
struct Evidence {
    score: f64,
    indicators: Vec<String>,
}

impl Evidence {
    fn add(&mut self, weight: f64, indicator: impl Into<String>) {
        self.score += weight;
        self.indicators.push(indicator.into());
    }
}

/// `raw` keeps the original casing for the caps check; keywords run on
/// `normalized`.
pub fn detect_emotional_state(
    raw: &str,
    normalized: &str,
    context: &ConversationContext,
) -> EmotionalStateDetection {
    let mut angry = Evidence::default();
    let mut frustrated = Evidence::default();
    let mut positive = Evidence::default();

    for term in lexicon::find_phrases(normalized, ANGRY_KEYWORDS) {
        angry.add(KEYWORD_WEIGHT, term);
    }
    for term in lexicon::find_phrases(normalized, FRUSTRATED_KEYWORDS) {
        frustrated.add(KEYWORD_WEIGHT, term);
    }
    for term in lexicon::find_phrases(normalized, POSITIVE_KEYWORDS) {
        positive.add(KEYWORD_WEIGHT, term);
    }

    if let Some(run) = CAPS_RUN.find(raw) {
        angry.add(CAPS_WEIGHT, format!("caps: {}", run.as_str()));
    }
    if raw.contains("!!!") {
        angry.add(PUNCTUATION_WEIGHT, "!!!");
    }
    if raw.contains("???") {
        frustrated.add(PUNCTUATION_WEIGHT, "???");
    }

    for emoji in lexicon::find_phrases(raw, ANGRY_EMOJI) {
        angry.add(EMOJI_WEIGHT, emoji);
    }
    for emoji in lexicon::find_phrases(raw, FRUSTRATED_EMOJI) {
        frustrated.add(EMOJI_WEIGHT, emoji);
    }
    for emoji in lexicon::find_phrases(raw, POSITIVE_EMOJI) {
        positive.add(EMOJI_WEIGHT, emoji);
    }

    // Ties resolve toward the more severe state.
    let mut best = (EmotionalState::Neutral, Evidence::default());
    for (state, evidence) in [
        (EmotionalState::Angry, angry),
        (EmotionalState::Frustrated, frustrated),
        (EmotionalState::Positive, positive),
    ] {
        if evidence.score > MIN_EVIDENCE && evidence.score > best.1.score {
            best = (state, evidence);
        }
    }
    let (state, evidence) = best;
    let confidence = evidence.score.min(1.0);

    let previous = context.emotional_state;
    let change_from_previous = match state.severity_rank().cmp(&previous.severity_rank()) {
        std::cmp::Ordering::Greater => EmotionalTrend::Escalated,
        std::cmp::Ordering::Less => EmotionalTrend::Improved,
        std::cmp::Ordering::Equal => EmotionalTrend::Stable,
    };

    EmotionalStateDetection {
        state,
        confidence,
        escalation_risk: escalation_risk(state, confidence, change_from_previous),
        change_from_previous,
        indicators: evidence.indicators,
    }
}

fn escalation_risk(state: EmotionalState, confidence: f64, trend: EmotionalTrend) -> RiskLevel {
    let escalated = trend == EmotionalTrend::Escalated;
    match state {
        EmotionalState::Angry if confidence >= 0.6 || escalated => RiskLevel::Critical,
        EmotionalState::Angry => RiskLevel::High,
        EmotionalState::Frustrated if escalated && confidence >= 0.6 => RiskLevel::High,
        EmotionalState::Frustrated => RiskLevel::Medium,
        EmotionalState::Neutral | EmotionalState::Positive => RiskLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::ContextDefaults;
    use crate::domain::detection::lexicon::normalize;
    use crate::domain::foundation::{ConversationId, Timestamp, UserId};

    fn context(previous: EmotionalState) -> ConversationContext {
        let defaults = ContextDefaults::new(UserId::unknown(), "web", 60);
        let mut ctx = ConversationContext::new(
            ConversationId::new("c").unwrap(),
            &defaults,
            Timestamp::from_unix_secs(0),
        );
        ctx.emotional_state = previous;
        ctx
    }

    fn detect(text: &str, previous: EmotionalState) -> EmotionalStateDetection {
        detect_emotional_state(text, &normalize(text), &context(previous))
    }

    #[test]
    fn neutral_message_stays_neutral() {
        let d = detect("Подскажите адрес офиса", EmotionalState::Neutral);
        assert_eq!(d.state, EmotionalState::Neutral);
        assert_eq!(d.confidence, 0.0);
        assert_eq!(d.change_from_previous, EmotionalTrend::Stable);
        assert_eq!(d.escalation_risk, RiskLevel::Low);
    }

    #[test]
    fn angry_keyword_plus_exclamations_is_critical() {
        let d = detect("Это безобразие!!!", EmotionalState::Neutral);
        assert_eq!(d.state, EmotionalState::Angry);
        assert!((d.confidence - 0.6).abs() < 1e-9);
        assert_eq!(d.change_from_previous, EmotionalTrend::Escalated);
        assert_eq!(d.escalation_risk, RiskLevel::Critical);
    }

    #[test]
    fn repeated_question_marks_signal_frustration() {
        let d = detect("Ну и где ответ???", EmotionalState::Neutral);
        assert_eq!(d.state, EmotionalState::Frustrated);
        assert_eq!(d.escalation_risk, RiskLevel::Medium);
    }

    #[test]
    fn caps_run_counts_as_anger() {
        let d = detect("ОТВЕТЬТЕ уже", EmotionalState::Angry);
        assert_eq!(d.state, EmotionalState::Angry);
        assert_eq!(d.change_from_previous, EmotionalTrend::Stable);
        assert_eq!(d.escalation_risk, RiskLevel::High);
    }

    #[test]
    fn single_emoji_is_not_enough() {
        let d = detect("ок 🙂", EmotionalState::Neutral);
        assert_eq!(d.state, EmotionalState::Neutral);
    }

    #[test]
    fn thanks_after_anger_is_improvement() {
        let d = detect("Спасибо, отлично", EmotionalState::Angry);
        assert_eq!(d.state, EmotionalState::Positive);
        assert_eq!(d.change_from_previous, EmotionalTrend::Improved);
    }
}
