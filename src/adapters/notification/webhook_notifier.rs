//! Webhook Notifier - POSTs handoff alerts to an operator chat endpoint.
//!
//! Body: `{"text": "...", "priority": "URGENT"}`. Any non-2xx status is a
//! delivery failure.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::handoff::Priority;
use crate::ports::{Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    token: Option<Secret<String>>,
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    priority: Priority,
}

pub struct WebhookNotifier {
    config: WebhookConfig,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Unavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str, priority: Priority) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.config.url).json(&WebhookPayload {
            text: message,
            priority,
        });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                NotifyError::Unavailable(e.to_string())
            } else {
                NotifyError::Delivery(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Delivery(format!("status {}: {}", status, body)))
        }
    }
}
