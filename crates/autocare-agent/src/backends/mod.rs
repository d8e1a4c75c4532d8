/// OpenAI-compatible chat completions.
pub mod openai;

use autocare_core::AutocareResult;
use async_trait::async_trait;

/// One prompt sent to a completion backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Persona and instructions, sent as the system message.
    pub system_prompt: String,
    /// Task text, sent as the user message.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    /// Request with the given prompts and temperature.
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            temperature,
        }
    }
}

/// Trait for text completion providers.
///
/// Latency and failure handling belong to the backend; callers see either
/// the model's text or an error.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Return the model's free-text answer to `request`.
    async fn complete(&self, request: &CompletionRequest) -> AutocareResult<String>;
}
