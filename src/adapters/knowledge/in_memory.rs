//! In-memory knowledge base, optionally loaded from a YAML file.
//!
//! ```yaml
//! items:
//!   - id: office-101
//!     title: Офис 101
//!     content: 20 м², 4 рабочих места, 45 000 ₽ в месяц
//!     category: office
//!     keywords: [офис, 101, цена]
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::domain::detection::lexicon::normalize;
use crate::ports::{KnowledgeBase, KnowledgeError, KnowledgeItem};

const KEYWORD_WEIGHT: u32 = 3;
const TITLE_WEIGHT: u32 = 2;
/// Shorter words ("на", "для") carry no signal.
const MIN_TOKEN_LEN: usize = 4;

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    items: Vec<KnowledgeItem>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeBase {
    items: Vec<KnowledgeItem>,
}

impl InMemoryKnowledgeBase {
    pub fn new(items: Vec<KnowledgeItem>) -> Self {
        Self { items }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, KnowledgeError> {
        let file: KnowledgeFile =
            serde_yaml::from_str(yaml).map_err(|e| KnowledgeError::Load(e.to_string()))?;
        Ok(Self::new(file.items))
    }

    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| KnowledgeError::Load(format!("{}: {}", path.display(), e)))?;
        let kb = Self::from_yaml_str(&raw)?;
        tracing::info!(path = %path.display(), items = kb.len(), "Knowledge base loaded");
        Ok(kb)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn score(item: &KnowledgeItem, query: &str, tokens: &[&str]) -> u32 {
        let keyword_hits = item
            .keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.is_empty() && query.contains(k.as_str()))
            .count() as u32;

        let title = normalize(&item.title);
        let content = normalize(&item.content);
        let title_hits = tokens.iter().filter(|t| title.contains(**t)).count() as u32;
        let content_hits = tokens.iter().filter(|t| content.contains(**t)).count() as u32;

        keyword_hits * KEYWORD_WEIGHT + title_hits * TITLE_WEIGHT + content_hits
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    async fn search(&self, text: &str, limit: usize) -> Result<Vec<KnowledgeItem>, KnowledgeError> {
        let query = normalize(text);
        let tokens: Vec<&str> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
            .collect();

        let mut ranked: Vec<(u32, &KnowledgeItem)> = self
            .items
            .iter()
            .map(|item| (Self::score(item, &query, &tokens), item))
            .filter(|(score, _)| *score > 0)
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn all_office_items(&self) -> Result<Vec<KnowledgeItem>, KnowledgeError> {
        Ok(self.items.iter().filter(|i| i.is_office()).cloned().collect())
    }
}
