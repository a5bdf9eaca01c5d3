//! Notifier Port - tells human operators a conversation needs them.
//!
//! Failures are returned, never panicked; callers log and carry on.

use async_trait::async_trait;

use crate::domain::handoff::Priority;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),

    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, priority: Priority) -> Result<(), NotifyError>;
}
