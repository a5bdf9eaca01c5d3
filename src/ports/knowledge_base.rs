//! Knowledge Base Port - ranked lookup of facts the agent may quote.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeCategory {
    /// A rentable office. Always passed to the generator.
    Office,
    Service,
    Faq,
    Policy,
    #[default]
    Other,
}

/// One fact, answer template or listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: KnowledgeCategory,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KnowledgeItem {
    pub fn is_office(&self) -> bool {
        self.category == KnowledgeCategory::Office
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge base unavailable: {0}")]
    Unavailable(String),

    #[error("failed to load knowledge base: {0}")]
    Load(String),
}

/// Port for knowledge retrieval.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Up to `limit` items, most relevant first.
    async fn search(&self, text: &str, limit: usize) -> Result<Vec<KnowledgeItem>, KnowledgeError>;

    /// Every office listing, regardless of relevance.
    async fn all_office_items(&self) -> Result<Vec<KnowledgeItem>, KnowledgeError>;
}
