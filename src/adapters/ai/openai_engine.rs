//! OpenAI Engine - Implementation of AiEngine over OpenAI's chat completions.
//!
//! The model is asked for a JSON object
//! `{text, confidence, requires_handoff, handoff_reason, used_knowledge}`.
//! A reply that is not valid JSON is used verbatim as the text.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let engine = OpenAiEngine::new(config)?;
//! ```
//!
//! Retries are the orchestrator's job; this adapter makes exactly one call.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::context::MessageRole;
use crate::ports::{AiEngine, AiEngineError, GenerationRequest, GenerationResponse, KnowledgeItem, Personality};

const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the OpenAI engine.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 600,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub struct OpenAiEngine {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiEngine {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiEngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiEngineError::InvalidRequest(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_request(&self, request: &GenerationRequest) -> OpenAiRequest {
        let mut messages = vec![OpenAiMessage {
            role: "system".to_string(),
            content: system_prompt(&request.personality, &request.knowledge),
        }];

        for msg in &request.context.message_history {
            let role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::System => continue,
            };
            messages.push(OpenAiMessage {
                role: role.to_string(),
                content: msg.text.clone(),
            });
        }

        let already_last = request
            .context
            .message_history
            .back()
            .is_some_and(|m| m.is_user() && m.text == request.text);
        if !already_last {
            messages.push(OpenAiMessage {
                role: "user".to_string(),
                content: request.text.clone(),
            });
        }

        OpenAiRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }

    async fn send_request(&self, request: &GenerationRequest) -> Result<Response, AiEngineError> {
        let body = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiEngineError::Timeout
                } else if e.is_connect() {
                    AiEngineError::Network(format!("Connection failed: {}", e))
                } else {
                    AiEngineError::Network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AiEngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(AiEngineError::AuthenticationFailed),
            429 => Err(AiEngineError::RateLimited {
                retry_after_secs: parse_retry_after(&error_body),
            }),
            400 => Err(AiEngineError::InvalidRequest(error_body)),
            500..=599 => Err(AiEngineError::Unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AiEngineError::Network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<GenerationResponse, AiEngineError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AiEngineError::Parse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiEngineError::Parse("No choices in response".to_string()))?;

        parse_reply(&choice.message.content)
    }
}

#[async_trait]
impl AiEngine for OpenAiEngine {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiEngineError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn system_prompt(personality: &Personality, knowledge: &[KnowledgeItem]) -> String {
    let mut prompt = format!(
        "Ты {name}, менеджер компании «{company}». Тон: {tone}. \
         Отвечай коротко, по-человечески, без markdown и списков. \
         Никогда не говори, что ты бот или ИИ. \
         Используй только факты из базы знаний ниже; не придумывай офисы, цены и условия. \
         Если ответа в базе нет или нужен живой менеджер, установи requires_handoff=true. \
         Ответь JSON-объектом с полями text, confidence (0..1), requires_handoff, \
         handoff_reason, used_knowledge (список id).",
        name = personality.name,
        company = personality.company,
        tone = personality.tone,
    );

    if !knowledge.is_empty() {
        prompt.push_str("\n\nБаза знаний:");
        for item in knowledge {
            prompt.push_str(&format!("\n[{}] {}: {}", item.id, item.title, item.content));
        }
    }
    prompt
}

/// JSON reply, or the raw content when the model ignored the format.
fn parse_reply(content: &str) -> Result<GenerationResponse, AiEngineError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AiEngineError::Parse("Empty completion".to_string()));
    }
    match serde_json::from_str::<GenerationResponse>(trimmed) {
        Ok(reply) if !reply.text.trim().is_empty() || reply.requires_handoff => Ok(reply),
        Ok(_) => Err(AiEngineError::Parse("Reply has no text".to_string())),
        Err(_) => Ok(GenerationResponse::text(trimmed)),
    }
}

fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .and_then(|msg| {
            let idx = msg.find("try again in ")?;
            let digits: String = msg[idx + "try again in ".len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ContextDefaults, ContextMessage, ConversationContext, HandledBy};
    use crate::domain::foundation::{ConversationId, Timestamp, UserId};
    use crate::ports::KnowledgeCategory;

    fn request(history: &[&str], text: &str) -> GenerationRequest {
        let defaults = ContextDefaults::new(UserId::unknown(), "web", 60);
        let mut ctx = ConversationContext::new(
            ConversationId::new("c").unwrap(),
            &defaults,
            Timestamp::now(),
        );
        for h in history {
            ctx.push_message(ContextMessage::user(*h, HandledBy::Ai), 20);
        }
        let office = KnowledgeItem {
            id: "office-101".to_string(),
            title: "Офис 101".to_string(),
            content: "20 м², 4 места".to_string(),
            category: KnowledgeCategory::Office,
            keywords: vec![],
        };
        GenerationRequest::new(text, ctx, vec![office], Personality::default())
    }

    fn engine() -> OpenAiEngine {
        OpenAiEngine::new(OpenAiConfig::new("sk-test").with_base_url("http://localhost:1/v1/"))
            .unwrap()
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAiConfig::new("sk-test")
            .with_model("gpt-4o")
            .with_temperature(0.2)
            .with_max_tokens(100);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.api_key(), "sk-test");
    }

    #[test]
    fn completions_url_strips_trailing_slash() {
        assert_eq!(engine().completions_url(), "http://localhost:1/v1/chat/completions");
    }

    #[test]
    fn current_message_is_not_duplicated() {
        let body = engine().to_openai_request(&request(&["Привет", "Сколько стоит?"], "Сколько стоит?"));
        let users: Vec<_> = body.messages.iter().filter(|m| m.role == "user").collect();
        assert_eq!(users.len(), 2);
        assert!(body.messages[0].content.contains("[office-101]"));
    }

    #[test]
    fn current_message_is_appended_when_missing() {
        let body = engine().to_openai_request(&request(&[], "Есть парковка?"));
        assert_eq!(body.messages.last().unwrap().content, "Есть парковка?");
    }

    #[test]
    fn json_reply_is_parsed() {
        let reply = parse_reply(r#"{"text":"Да, есть","confidence":0.9,"requires_handoff":false}"#).unwrap();
        assert_eq!(reply.text, "Да, есть");
        assert_eq!(reply.confidence, 0.9);
    }

    #[test]
    fn plain_reply_is_used_verbatim() {
        let reply = parse_reply("Да, парковка есть.").unwrap();
        assert_eq!(reply.text, "Да, парковка есть.");
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert!(matches!(parse_reply("  "), Err(AiEngineError::Parse(_))));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 12 seconds."}}"#;
        assert_eq!(parse_retry_after(error), 12);
        assert_eq!(parse_retry_after("not json"), DEFAULT_RETRY_AFTER_SECS);
    }
}
