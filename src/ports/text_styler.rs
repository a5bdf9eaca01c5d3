//! Text Styler Port - pure transforms that make generated text read like a
//! person typed it.

use std::time::Duration;

use crate::domain::context::ConversationContext;

use super::ai_engine::Personality;

pub trait TextStyler: Send + Sync {
    /// Replaces stiff phrasing with conversational equivalents.
    fn make_natural(&self, text: &str) -> String;

    /// Small human touches (softeners, occasional informality).
    fn add_human_touch(&self, text: &str, context: &ConversationContext) -> String;

    /// 0.0 (human) to 1.0 (obviously machine-written).
    fn check_roboticness(&self, text: &str) -> f64;

    fn apply_personality(&self, text: &str, personality: &Personality) -> String;

    /// How long a person would take to type `text`.
    fn typing_delay(&self, text: &str) -> Duration;
}
