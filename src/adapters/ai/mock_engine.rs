//! Mock AI Engine for testing.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Error injection, including "fail every call"
//! - Simulated latency
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let engine = MockAiEngine::new()
//!     .with_response("Офис 101 стоит 50 000 ₽ в месяц.")
//!     .with_delay(Duration::from_millis(100));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AiEngine, AiEngineError, GenerationRequest, GenerationResponse};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(GenerationResponse),
    Error(AiEngineError),
}

#[derive(Debug, Clone, Default)]
pub struct MockAiEngine {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Returned for every call once set, ignoring the queue.
    always_fail: Option<AiEngineError>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAiEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_generation(GenerationResponse::text(text))
    }

    pub fn with_generation(self, response: GenerationResponse) -> Self {
        lock(&self.responses).push_back(MockResponse::Success(response));
        self
    }

    pub fn with_error(self, error: AiEngineError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    pub fn failing(mut self, error: AiEngineError) -> Self {
        self.always_fail = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    fn next_response(&self) -> MockResponse {
        if let Some(error) = &self.always_fail {
            return MockResponse::Error(error.clone());
        }
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success(GenerationResponse::text("Mock response")))
    }
}

#[async_trait]
impl AiEngine for MockAiEngine {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiEngineError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
