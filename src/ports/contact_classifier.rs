//! Contact Classifier Port - sorts inbound contacts before the agent answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::context::ConversationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactCategory {
    /// A prospective or existing tenant.
    Client,
    /// Dropped without a reply.
    Spam,
    Partner,
    Vendor,
    JobSeeker,
    Press,
}

impl ContactCategory {
    /// Categories a human should handle instead of the agent.
    pub fn is_flagged(&self) -> bool {
        matches!(
            self,
            ContactCategory::Partner
                | ContactCategory::Vendor
                | ContactCategory::JobSeeker
                | ContactCategory::Press
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactClassification {
    pub category: ContactCategory,
    /// Why the classifier decided so, for the operator.
    pub reason: String,
}

impl ContactClassification {
    pub fn client() -> Self {
        Self {
            category: ContactCategory::Client,
            reason: String::new(),
        }
    }
}

#[async_trait]
pub trait ContactClassifier: Send + Sync {
    /// Infallible: anything unclear is a client.
    async fn classify(&self, text: &str, context: &ConversationContext) -> ContactClassification;
}
