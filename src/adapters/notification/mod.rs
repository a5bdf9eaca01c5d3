//! Notification adapters - Implementations of the Notifier port.

mod log_notifier;
mod recording;
mod webhook_notifier;

pub use log_notifier::LogNotifier;
pub use recording::RecordingNotifier;
pub use webhook_notifier::{WebhookConfig, WebhookNotifier};
