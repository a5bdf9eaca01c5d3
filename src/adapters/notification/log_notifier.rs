//! Notifier that only writes to the log. Used when no webhook is configured.

use async_trait::async_trait;

use crate::domain::handoff::Priority;
use crate::ports::{Notifier, NotifyError};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, priority: Priority) -> Result<(), NotifyError> {
        match priority {
            Priority::Urgent | Priority::High => {
                tracing::warn!(%priority, message, "Operator attention required")
            }
            Priority::Normal | Priority::Low => {
                tracing::info!(%priority, message, "Operator attention required")
            }
        }
        Ok(())
    }
}
