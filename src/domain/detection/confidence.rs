//! How safely the automated agent can answer a message on its own.

use crate::domain::context::ConversationContext;

use super::analysis::{ConfidenceFactors, ConfidenceRecommendation, ConfidenceScore};
use super::lexicon::{self, HALLUCINATION_RISK_KEYWORDS, TOPIC_KEYWORDS};
use super::thresholds::ConfidenceThresholds;

const TOPIC_WEIGHT: f64 = 40.0;
const CLARITY_WEIGHT: f64 = 20.0;
const HALLUCINATION_WEIGHT: f64 = 25.0;
const CONTEXT_WEIGHT: f64 = 15.0;

const RISK_PER_KEYWORD: f64 = 0.25;

pub fn score_confidence(
    normalized: &str,
    context: &ConversationContext,
    thresholds: &ConfidenceThresholds,
) -> ConfidenceScore {
    let factors = ConfidenceFactors {
        topic_match: topic_match(normalized),
        clarity: clarity(normalized),
        hallucination_risk: hallucination_risk(normalized),
        context_relevance: context_relevance(context.message_history.len()),
    };

    let blended = TOPIC_WEIGHT * factors.topic_match
        + CLARITY_WEIGHT * factors.clarity
        + HALLUCINATION_WEIGHT * (1.0 - factors.hallucination_risk)
        + CONTEXT_WEIGHT * factors.context_relevance;
    let score = blended.round().clamp(0.0, 100.0) as u32;

    let recommendation = if score >= thresholds.min_score {
        ConfidenceRecommendation::Send
    } else if score >= thresholds.handoff_threshold {
        ConfidenceRecommendation::Review
    } else {
        ConfidenceRecommendation::Handoff
    };

    ConfidenceScore {
        score,
        factors,
        recommendation,
    }
}

fn topic_match(normalized: &str) -> f64 {
    match lexicon::find_phrases(normalized, TOPIC_KEYWORDS).len() {
        0 => 0.2,
        1 => 0.7,
        _ => 1.0,
    }
}

fn clarity(normalized: &str) -> f64 {
    match lexicon::word_count(normalized) {
        0 => 0.0,
        1..=2 => 0.5,
        3..=40 => 1.0,
        _ => 0.6,
    }
}

fn hallucination_risk(normalized: &str) -> f64 {
    let hits = lexicon::find_phrases(normalized, HALLUCINATION_RISK_KEYWORDS).len();
    (hits as f64 * RISK_PER_KEYWORD).min(1.0)
}

/// Longer histories give the generator more to go on.
fn context_relevance(history_len: usize) -> f64 {
    match history_len {
        0 => 0.5,
        1..=2 => 0.6,
        3..=10 => 0.8,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ContextDefaults, ContextMessage, HandledBy};
    use crate::domain::detection::lexicon::normalize;
    use crate::domain::foundation::{ConversationId, Timestamp, UserId};

    fn context(history: usize) -> ConversationContext {
        let defaults = ContextDefaults::new(UserId::unknown(), "web", 60);
        let mut ctx = ConversationContext::new(
            ConversationId::new("c").unwrap(),
            &defaults,
            Timestamp::from_unix_secs(0),
        );
        for i in 0..history {
            ctx.push_message(ContextMessage::user(format!("m{}", i), HandledBy::Ai), 20);
        }
        ctx
    }

    fn score(text: &str, history: usize) -> ConfidenceScore {
        score_confidence(&normalize(text), &context(history), &ConfidenceThresholds::default())
    }

    #[test]
    fn on_topic_price_question_is_confident() {
        let s = score("Сколько стоит офис?", 1);
        // 40 + 20 + 25 + 9
        assert_eq!(s.score, 94);
        assert_eq!(s.recommendation, ConfidenceRecommendation::Send);
    }

    #[test]
    fn off_topic_short_message_needs_review() {
        let s = score("Ты бот?", 1);
        // 8 + 10 + 25 + 9
        assert_eq!(s.score, 52);
        assert_eq!(s.recommendation, ConfidenceRecommendation::Review);
    }

    #[test]
    fn risky_legal_question_falls_below_handoff_line() {
        let s = score("Гарантируете юридически точно по закону?", 0);
        // 8 + 20 + 0 + 7.5
        assert_eq!(s.score, 36);
        assert_eq!(s.recommendation, ConfidenceRecommendation::Handoff);
        assert_eq!(s.factors.hallucination_risk, 1.0);
    }

    #[test]
    fn longer_history_raises_context_relevance() {
        let short = score("Сколько стоит офис?", 0);
        let long = score("Сколько стоит офис?", 12);
        assert!(long.score > short.score);
    }
}
