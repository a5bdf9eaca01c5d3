//! Keyword contact classifier.
//!
//! Checked in order: spam, press, job seekers, vendors, partners. Anything
//! else is a client.

use async_trait::async_trait;

use crate::domain::context::ConversationContext;
use crate::domain::detection::lexicon::{find_phrases, normalize};
use crate::ports::{ContactCategory, ContactClassification, ContactClassifier};

const SPAM: &[&str] = &[
    "казино",
    "ставки на спорт",
    "заработок без вложений",
    "заработок в интернете",
    "пассивный доход",
    "криптовалют",
    "bit.ly",
    "раскрутка",
    "продвижение сайтов",
];

const PRESS: &[&str] = &["журналист", "интервью", "редакци", "сми ", "для статьи", "пресс-служб"];

const JOB_SEEKER: &[&str] = &["ищу работу", "ваканси", "резюме", "трудоустро", "стажировк"];

const VENDOR: &[&str] = &[
    "коммерческое предложение",
    "предлагаем услуги",
    "предлагаю услуги",
    "наша компания предлагает",
    "поставк",
    "клининг",
];

const PARTNER: &[&str] = &["партнерств", "сотрудничеств", "агентский договор", "совместн"];

const RULES: &[(ContactCategory, &[&str])] = &[
    (ContactCategory::Spam, SPAM),
    (ContactCategory::Press, PRESS),
    (ContactCategory::JobSeeker, JOB_SEEKER),
    (ContactCategory::Vendor, VENDOR),
    (ContactCategory::Partner, PARTNER),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordContactClassifier;

impl KeywordContactClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContactClassifier for KeywordContactClassifier {
    async fn classify(&self, text: &str, _context: &ConversationContext) -> ContactClassification {
        let normalized = format!("{} ", normalize(text));
        RULES
            .iter()
            .find_map(|(category, phrases)| {
                let hits = find_phrases(&normalized, phrases);
                (!hits.is_empty()).then(|| ContactClassification {
                    category: *category,
                    reason: format!("matched: {}", hits.join(", ")),
                })
            })
            .unwrap_or_else(ContactClassification::client)
    }
}
