use crate::backends::openai::OpenAiBackend;
use crate::backends::{CompletionBackend, CompletionRequest};
use crate::config::ModelConfig;
use autocare_core::AutocareResult;
use std::sync::Arc;

/// Completion client that dispatches to the configured provider backend.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn CompletionBackend>,
}

impl LlmClient {
    /// Client for the provider named in `config`.
    pub fn new(config: ModelConfig) -> AutocareResult<Self> {
        // Every supported provider speaks the OpenAI wire format.
        let backend = OpenAiBackend::new(config)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Create from a pre-built backend (for custom providers and tests).
    pub fn from_backend(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Send one request and return the model's text.
    pub async fn complete(&self, request: &CompletionRequest) -> AutocareResult<String> {
        self.backend.complete(request).await
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient").finish_non_exhaustive()
    }
}
