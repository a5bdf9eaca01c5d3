//! AI adapters - Implementations of the AiEngine port.
//!
//! - `OpenAiEngine` - OpenAI chat completions in JSON mode
//! - `MockAiEngine` - Scripted replies and failures for tests

mod mock_engine;
mod openai_engine;

pub use mock_engine::{MockAiEngine, MockResponse};
pub use openai_engine::{OpenAiConfig, OpenAiEngine};
