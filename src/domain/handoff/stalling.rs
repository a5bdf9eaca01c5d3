//! Stalling messages: short replies that cover the gap until an operator
//! picks the conversation up.

use rand::seq::SliceRandom;
use std::collections::HashMap;

use super::HandoffReasonKind;

/// Used when neither built-in nor configured templates exist.
pub const FALLBACK_STALLING_MESSAGE: &str = "Одну минуту, уточню детали и вернусь к вам.";

/// Built-in templates for a reason kind.
pub fn default_templates(kind: HandoffReasonKind) -> &'static [&'static str] {
    use HandoffReasonKind::*;
    match kind {
        AiProbing => &[
            "Секунду, сейчас посмотрю и отвечу.",
            "Минутку, отвлекли. Сейчас вернусь к вашему вопросу.",
            "Одну минуту, уточняю информацию.",
        ],
        ComplexQuery => &[
            "Хороший вопрос, дайте мне пару минут, соберу всю информацию.",
            "Сейчас уточню все детали и вернусь с подробным ответом.",
            "Это лучше посчитать точно. Минутку, подготовлю ответ.",
        ],
        EmotionalEscalation => &[
            "Понимаю вас. Сейчас разберусь в ситуации лично.",
            "Прошу прощения за неудобства. Уже занимаюсь вашим вопросом.",
            "Понимаю, что это неприятно. Дайте мне минуту, всё решим.",
        ],
        LowConfidence => &[
            "Хочу ответить точно. Уточню у коллег и вернусь к вам.",
            "Минутку, проверю информацию, чтобы не ошибиться.",
        ],
        ClientRequest => &[
            "Конечно, сейчас подключится менеджер.",
            "Хорошо, передаю ваш вопрос менеджеру, он скоро ответит.",
        ],
        TechnicalIssue => &[
            "Прошу прощения, небольшая заминка. Скоро вернусь с ответом.",
            "Минутку, уточняю информацию и сразу вернусь.",
        ],
        Profanity => &[
            "Давайте спокойно разберёмся. Сейчас к разговору подключится менеджер.",
        ],
        PromptInjection => &[
            "Секунду, уточню по вашему вопросу.",
            "Минутку, сейчас вернусь к вам.",
        ],
        MediaRequest => &[
            "Сейчас подберу фото и видео и пришлю вам.",
            "Минутку, найду материалы по этому офису.",
        ],
        ViewingRequest => &[
            "Отлично, сейчас согласую удобное время просмотра.",
            "С радостью покажем. Минутку, уточню свободные слоты.",
        ],
        ClientNearby => &[
            "Отлично! Сейчас предупрежу коллег, вас встретят.",
            "Минутку, сейчас уточню, кто сможет вас встретить.",
        ],
        PurchaseSale => &[
            "По покупке и продаже вас проконсультирует менеджер, сейчас подключу его.",
        ],
        SubleaseLongTerm => &[
            "По долгосрочной аренде и субаренде лучше обсудить детали с менеджером. Сейчас подключу его.",
        ],
        OfficeCustomization => &[
            "По изменениям в офисе уточню возможности и вернусь к вам.",
        ],
        FlaggedContact => &[
            "Спасибо за сообщение. Передаю его ответственному сотруднику.",
        ],
        OffTopic => &[
            "Я могу помочь с вопросами аренды офисов. Сейчас подключу коллегу.",
        ],
        AiDeclared => &[
            "Минутку, уточню детали и вернусь к вам.",
            "Сейчас проверю и отвечу.",
        ],
    }
}

/// Picks stalling messages from built-in and operator-configured templates.
#[derive(Debug, Clone, Default)]
pub struct StallingCatalog {
    generic: Vec<String>,
    custom: HashMap<HandoffReasonKind, Vec<String>>,
}

impl StallingCatalog {
    /// `generic` is used only for kinds with no templates at all.
    pub fn new(generic: Vec<String>, custom: HashMap<HandoffReasonKind, Vec<String>>) -> Self {
        Self { generic, custom }
    }

    /// All templates eligible for `kind`: built-in plus custom.
    pub fn candidates(&self, kind: HandoffReasonKind) -> Vec<&str> {
        let mut out: Vec<&str> = default_templates(kind).to_vec();
        if let Some(custom) = self.custom.get(&kind) {
            out.extend(custom.iter().map(String::as_str).filter(|s| !s.trim().is_empty()));
        }
        if out.is_empty() {
            out.extend(self.generic.iter().map(String::as_str));
        }
        out
    }

    /// Uniformly random choice among the candidates.
    pub fn pick(&self, kind: HandoffReasonKind) -> String {
        self.candidates(kind)
            .choose(&mut rand::thread_rng())
            .map(|s| s.to_string())
            .unwrap_or_else(|| FALLBACK_STALLING_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_built_in_templates() {
        for kind in HandoffReasonKind::ALL {
            assert!(!default_templates(kind).is_empty(), "{kind} has no templates");
        }
    }

    #[test]
    fn pick_without_custom_comes_from_defaults() {
        let catalog = StallingCatalog::default();
        for _ in 0..20 {
            let msg = catalog.pick(HandoffReasonKind::AiProbing);
            assert!(default_templates(HandoffReasonKind::AiProbing).contains(&msg.as_str()));
        }
    }

    #[test]
    fn custom_templates_are_mixed_in() {
        let mut custom = HashMap::new();
        custom.insert(
            HandoffReasonKind::ViewingRequest,
            vec!["Запишу вас на просмотр.".to_string(), "  ".to_string()],
        );
        let catalog = StallingCatalog::new(vec![], custom);

        let candidates = catalog.candidates(HandoffReasonKind::ViewingRequest);
        assert!(candidates.contains(&"Запишу вас на просмотр."));
        assert_eq!(
            candidates.len(),
            default_templates(HandoffReasonKind::ViewingRequest).len() + 1
        );
    }
}
