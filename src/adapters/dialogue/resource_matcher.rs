//! Keyword resource matcher: the first rule whose keyword appears in the
//! message and whose attachment was not sent yet.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::domain::detection::lexicon::normalize;
use crate::ports::{Attachment, AttachmentKind, ResourceMatcher};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceRule {
    pub keywords: Vec<String>,
    pub attachment: Attachment,
}

#[derive(Debug, Clone)]
pub struct KeywordResourceMatcher {
    rules: Vec<ResourceRule>,
}

impl KeywordResourceMatcher {
    pub fn new(rules: Vec<ResourceRule>) -> Self {
        Self { rules }
    }
}

impl Default for KeywordResourceMatcher {
    fn default() -> Self {
        let rule = |keywords: &[&str], id: &str, kind, url: &str, caption: &str| ResourceRule {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            attachment: Attachment {
                id: id.to_string(),
                kind,
                url: url.to_string(),
                caption: Some(caption.to_string()),
            },
        };
        Self::new(vec![
            rule(
                &["презентаци", "буклет"],
                "presentation",
                AttachmentKind::Document,
                "/files/presentation.pdf",
                "Презентация бизнес-центра",
            ),
            rule(
                &["прайс", "тариф"],
                "price-list",
                AttachmentKind::Document,
                "/files/price-list.pdf",
                "Актуальные тарифы",
            ),
            rule(
                &["как добраться", "как проехать", "схема проезда", "где вы находитесь"],
                "route-map",
                AttachmentKind::Link,
                "https://yandex.ru/maps/",
                "Схема проезда",
            ),
        ])
    }
}

impl ResourceMatcher for KeywordResourceMatcher {
    fn find(&self, text: &str, already_sent: &BTreeSet<String>) -> Option<Attachment> {
        let normalized = normalize(text);
        self.rules
            .iter()
            .filter(|rule| !already_sent.contains(&rule.attachment.id))
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|k| normalized.contains(normalize(k).as_str()))
            })
            .map(|rule| rule.attachment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_keyword() {
        let matcher = KeywordResourceMatcher::default();
        let found = matcher.find("Пришлите прайс, пожалуйста", &BTreeSet::new()).unwrap();
        assert_eq!(found.id, "price-list");
    }

    #[test]
    fn already_sent_attachment_is_skipped() {
        let matcher = KeywordResourceMatcher::default();
        let sent: BTreeSet<String> = ["route-map".to_string()].into_iter().collect();
        assert!(matcher.find("Как добраться до вас?", &sent).is_none());
    }

    #[test]
    fn nothing_matches_plain_question() {
        let matcher = KeywordResourceMatcher::default();
        assert!(matcher.find("Есть свободные офисы?", &BTreeSet::new()).is_none());
    }

    #[test]
    fn rules_deserialize_from_yaml() {
        let rules: Vec<ResourceRule> = serde_yaml::from_str(
            "- keywords: [меню]\n  attachment: {id: menu, kind: image, url: /m.png}\n",
        )
        .unwrap();
        assert_eq!(rules[0].attachment.kind, AttachmentKind::Image);
        assert!(rules[0].attachment.caption.is_none());
    }
}
