//! Rule-based text styler.
//!
//! Phrase tables, no model calls. Every transform is deterministic so that
//! replies are reproducible in tests.

use std::time::Duration;

use crate::domain::context::ConversationContext;
use crate::ports::{Personality, TextStyler};

/// Stiff office-speak and its conversational replacement.
const STIFF_PHRASES: &[(&str, &str)] = &[
    ("Благодарим вас за обращение", "Спасибо, что написали"),
    ("благодарим вас за обращение", "спасибо, что написали"),
    ("Обращаем ваше внимание, что ", ""),
    ("Сообщаем вам, что ", ""),
    ("Уважаемый клиент, ", ""),
    ("В настоящий момент", "Сейчас"),
    ("в настоящий момент", "сейчас"),
    ("В данный момент", "Сейчас"),
    ("в данный момент", "сейчас"),
    ("осуществить", "сделать"),
    ("Осуществить", "Сделать"),
    ("в случае если", "если"),
    ("В случае если", "Если"),
    ("денежные средства", "деньги"),
    ("на сегодняшний день", "сейчас"),
];

/// Phrases people rarely type but generators love.
const ROBOTIC_MARKERS: &[&str] = &[
    "как искусственный интеллект",
    "как языковая модель",
    "чем я могу вам помочь",
    "обращаем ваше внимание",
    "благодарим вас",
    "надеюсь, это поможет",
    "если у вас есть дополнительные вопросы",
    "уважаемый клиент",
    "в соответствии с",
    "данный",
    "не стесняйтесь",
];

const MARKER_WEIGHT: f64 = 0.2;
const LONG_SENTENCE_WORDS: usize = 25;

const FRIENDLY_EMOJI: &str = "🙂";

#[derive(Debug, Clone)]
pub struct RuleBasedTextStyler {
    chars_per_sec: f64,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RuleBasedTextStyler {
    fn default() -> Self {
        Self {
            chars_per_sec: 15.0,
            min_delay: Duration::from_millis(800),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RuleBasedTextStyler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_typing_speed(mut self, chars_per_sec: f64, min: Duration, max: Duration) -> Self {
        self.chars_per_sec = chars_per_sec.max(1.0);
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }
}

fn contains_emoji(text: &str) -> bool {
    text.chars().any(|c| ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c))
}

impl TextStyler for RuleBasedTextStyler {
    fn make_natural(&self, text: &str) -> String {
        STIFF_PHRASES
            .iter()
            .fold(text.to_string(), |acc, (stiff, natural)| acc.replace(stiff, natural))
    }

    fn add_human_touch(&self, text: &str, context: &ConversationContext) -> String {
        if context.emotional_state.is_negative() && !text.starts_with("Понимаю") {
            return format!("Понимаю вас. {}", text);
        }
        text.to_string()
    }

    fn check_roboticness(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let hits = ROBOTIC_MARKERS.iter().filter(|m| lower.contains(**m)).count();
        let mut score = hits as f64 * MARKER_WEIGHT;

        if text.contains("**") || text.contains("##") || text.lines().any(|l| l.trim_start().starts_with("- ")) {
            score += MARKER_WEIGHT;
        }

        let sentences: Vec<&str> = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !sentences.is_empty() {
            let words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
            if words / sentences.len() > LONG_SENTENCE_WORDS {
                score += MARKER_WEIGHT;
            }
        }

        score.min(1.0)
    }

    fn apply_personality(&self, text: &str, personality: &Personality) -> String {
        let text = text.replace("{name}", &personality.name);
        let friendly = personality.tone.eq_ignore_ascii_case("friendly");
        if personality.use_emoji && friendly && !contains_emoji(&text) && text.ends_with(['.', '!']) {
            return format!("{} {}", text, FRIENDLY_EMOJI);
        }
        text
    }

    fn typing_delay(&self, text: &str) -> Duration {
        let secs = text.chars().count() as f64 / self.chars_per_sec;
        Duration::from_secs_f64(secs).clamp(self.min_delay, self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ContextDefaults, EmotionalState};
    use crate::domain::foundation::{ConversationId, Timestamp, UserId};

    fn context(state: EmotionalState) -> ConversationContext {
        let defaults = ContextDefaults::new(UserId::unknown(), "web", 60);
        let mut ctx = ConversationContext::new(
            ConversationId::new("c").unwrap(),
            &defaults,
            Timestamp::now(),
        );
        ctx.emotional_state = state;
        ctx
    }

    #[test]
    fn make_natural_replaces_office_speak() {
        let styler = RuleBasedTextStyler::new();
        assert_eq!(
            styler.make_natural("В настоящий момент свободен офис 101."),
            "Сейчас свободен офис 101."
        );
    }

    #[test]
    fn human_touch_acknowledges_negative_mood() {
        let styler = RuleBasedTextStyler::new();
        let calm = styler.add_human_touch("Офис свободен.", &context(EmotionalState::Neutral));
        let upset = styler.add_human_touch("Офис свободен.", &context(EmotionalState::Frustrated));
        assert_eq!(calm, "Офис свободен.");
        assert_eq!(upset, "Понимаю вас. Офис свободен.");
    }

    #[test]
    fn roboticness_grows_with_markers() {
        let styler = RuleBasedTextStyler::new();
        let human = styler.check_roboticness("Да, парковка есть, два часа бесплатно.");
        let robot = styler.check_roboticness(
            "Уважаемый клиент, благодарим вас за вопрос. Надеюсь, это поможет! Не стесняйтесь писать.",
        );
        assert_eq!(human, 0.0);
        assert!(robot >= 0.6);
        assert!(robot <= 1.0);
    }

    #[test]
    fn personality_adds_emoji_only_when_enabled() {
        let styler = RuleBasedTextStyler::new();
        let mut p = Personality::default();
        assert_eq!(styler.apply_personality("Жду вас.", &p), "Жду вас.");
        p.use_emoji = true;
        assert_eq!(styler.apply_personality("Жду вас.", &p), "Жду вас. 🙂");
        assert_eq!(styler.apply_personality("Жду вас 😊.", &p), "Жду вас 😊.");
    }

    #[test]
    fn typing_delay_is_clamped() {
        let styler = RuleBasedTextStyler::new();
        assert_eq!(styler.typing_delay("да"), Duration::from_millis(800));
        assert_eq!(styler.typing_delay(&"а".repeat(1_000)), Duration::from_secs(8));
        let mid = styler.typing_delay(&"а".repeat(60));
        assert_eq!(mid, Duration::from_secs(4));
    }
}
