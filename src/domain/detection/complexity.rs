//! Additive complexity scoring of a customer request.

use super::analysis::{ComplexityRecommendation, ComplexityScore};
use super::lexicon::{
    self, CALCULATION_PATTERN, CALCULATION_PHRASES, COMPLEXITY_KEYWORDS, EVENT_FOR_PEOPLE,
    EXTERNAL_DATA_PHRASES, MULTI_STEP_CONNECTIVES, PRICE_WORDS, VIEWING_REQUEST,
    VIEWING_TIME_WORDS,
};
use super::thresholds::ComplexityThresholds;

const KEYWORD_POINTS: u32 = 15;
const KEYWORD_CAP: u32 = 45;
const MULTI_STEP_POINTS: u32 = 15;
const CALCULATION_POINTS: u32 = 15;
const EXTERNAL_DATA_POINTS: u32 = 10;
const AMBIGUOUS_POINTS: u32 = 5;
const EVENT_POINTS: u32 = 20;

pub fn score_complexity(normalized: &str, thresholds: &ComplexityThresholds) -> ComplexityScore {
    let mut score = 0u32;
    let mut factors = Vec::new();

    let keywords = lexicon::find_phrases(normalized, COMPLEXITY_KEYWORDS);
    if !keywords.is_empty() {
        score += (keywords.len() as u32 * KEYWORD_POINTS).min(KEYWORD_CAP);
        factors.push(format!("complex topics: {}", keywords.join(", ")));
    }

    let question_marks = normalized.matches('?').count();
    let connectives = lexicon::find_phrases(normalized, MULTI_STEP_CONNECTIVES);
    if question_marks >= 2 || !connectives.is_empty() {
        score += MULTI_STEP_POINTS;
        factors.push("multiple questions".to_string());
    }

    if CALCULATION_PATTERN.is_match(normalized)
        || !lexicon::find_phrases(normalized, CALCULATION_PHRASES).is_empty()
    {
        score += CALCULATION_POINTS;
        factors.push("calculation required".to_string());
    }

    if !lexicon::find_phrases(normalized, EXTERNAL_DATA_PHRASES).is_empty() {
        score += EXTERNAL_DATA_POINTS;
        factors.push("needs external data".to_string());
    }

    let words = lexicon::word_count(normalized);
    if words > 0 && words <= 2 && question_marks == 0 {
        score += AMBIGUOUS_POINTS;
        factors.push("short and ambiguous".to_string());
    }

    if EVENT_FOR_PEOPLE.is_match(normalized) {
        score += EVENT_POINTS;
        factors.push("event for a group".to_string());
    }

    let score = score.min(100);
    let recommendation = if score < thresholds.max_score {
        ComplexityRecommendation::Answer
    } else if score < thresholds.handoff_threshold {
        ComplexityRecommendation::Clarify
    } else {
        ComplexityRecommendation::Handoff
    };

    ComplexityScore {
        score,
        factors,
        missing_info: missing_info(normalized),
        recommendation,
    }
}

fn missing_info(normalized: &str) -> Vec<String> {
    let mut missing = Vec::new();
    let has_number = normalized.chars().any(|c| c.is_ascii_digit());

    if !lexicon::find_phrases(normalized, PRICE_WORDS).is_empty() && !has_number {
        missing.push("team_size_or_area".to_string());
    }
    if !lexicon::find_phrases(normalized, VIEWING_REQUEST).is_empty()
        && lexicon::find_phrases(normalized, VIEWING_TIME_WORDS).is_empty()
    {
        missing.push("preferred_time".to_string());
    }
    missing
}
