//! Rule-based script book: operator requests, greetings, de-escalation and
//! off-topic deflection.

use crate::domain::context::ConversationContext;
use crate::domain::detection::lexicon::{find_phrases, normalize, word_count, TOPIC_KEYWORDS};
use crate::domain::handoff::{HandoffReason, HandoffReasonKind, Severity};
use crate::ports::{Greeting, Personality, ScriptBook, ScriptedReply};

const OPERATOR_REQUEST: &[&str] = &[
    "позовите оператора",
    "позови оператора",
    "соедините с оператором",
    "нужен оператор",
    "позовите менеджера",
    "позови менеджера",
    "соедините с менеджером",
    "переключите на менеджера",
    "хочу поговорить с менеджером",
    "хочу поговорить с человеком",
    "с реальным человеком",
    "с живым человеком",
    "нужен живой человек",
];

/// Longest first so "добрый день" wins over a shorter prefix.
const GREETINGS: &[&str] = &[
    "здравствуйте",
    "приветствую",
    "добрый день",
    "добрый вечер",
    "доброе утро",
    "доброй ночи",
    "здрасьте",
    "привет",
    "hello",
    "hi",
];

const OFF_TOPIC: &[&str] = &[
    "погод",
    "анекдот",
    "шутк",
    "футбол",
    "хоккей",
    "политик",
    "рецепт",
    "стих",
    "гороскоп",
    "как дела",
    "что посоветуешь посмотреть",
];

pub struct RuleBasedScriptBook {
    personality: Personality,
}

impl RuleBasedScriptBook {
    pub fn new(personality: Personality) -> Self {
        Self { personality }
    }

    fn operator_request(&self) -> ScriptedReply {
        ScriptedReply {
            name: "operator_request".to_string(),
            messages: vec![
                "Конечно, сейчас позову менеджера.".to_string(),
                "Он подключится к переписке в течение нескольких минут.".to_string(),
            ],
            handoff: Some(HandoffReason::new(
                HandoffReasonKind::ClientRequest,
                "Customer asked for a human operator",
                Severity::Medium,
                "operator_request_script",
            )),
        }
    }
}

/// Text after `greeting`, with separators trimmed.
/// Drops the greeting from the raw text. A space in `greeting` stands for
/// any run of whitespace, since it was matched against normalized text.
fn strip_greeting(text: &str, greeting: &str) -> String {
    let mut rest = text.trim_start();
    for expected in greeting.chars() {
        if expected.is_whitespace() {
            rest = rest.trim_start();
        } else {
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str();
        }
    }
    rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '!' | '.' | ')' | '-'))
        .trim_end()
        .to_string()
}

impl ScriptBook for RuleBasedScriptBook {
    fn match_script(&self, text: &str, _context: &ConversationContext) -> Option<ScriptedReply> {
        let normalized = normalize(text);
        if find_phrases(&normalized, OPERATOR_REQUEST).is_empty() {
            return None;
        }
        Some(self.operator_request())
    }

    fn detect_greeting(&self, text: &str, context: &ConversationContext) -> Option<Greeting> {
        if context.has_assistant_messages() {
            return None;
        }

        let normalized = normalize(text);
        let greeting = GREETINGS.iter().find(|g| {
            normalized.starts_with(**g)
                && normalized[g.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !c.is_alphanumeric())
        })?;

        let rest = strip_greeting(text, greeting);
        let substantive = word_count(&rest) >= 2 || rest.contains('?');

        if substantive {
            Some(Greeting {
                reply: format!("Здравствуйте! Меня зовут {}.", self.personality.name),
                remainder: Some(rest),
            })
        } else {
            Some(Greeting {
                reply: format!(
                    "Здравствуйте! Меня зовут {}, я менеджер «{}». Чем могу помочь?",
                    self.personality.name, self.personality.company
                ),
                remainder: None,
            })
        }
    }

    fn de_escalation(&self) -> Vec<String> {
        vec![
            "Понимаю, что ситуация неприятная, и мне жаль, что так вышло.".to_string(),
            "Давайте я подключу старшего менеджера, он во всём разберётся.".to_string(),
        ]
    }

    fn is_off_topic(&self, text: &str) -> bool {
        let normalized = normalize(text);
        !find_phrases(&normalized, OFF_TOPIC).is_empty()
            && find_phrases(&normalized, TOPIC_KEYWORDS).is_empty()
    }

    fn off_topic_reply(&self) -> String {
        "Я помогаю с арендой офисов и услугами бизнес-центра. Подскажите, что вас интересует?"
            .to_string()
    }
}
