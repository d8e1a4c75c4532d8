use super::{CompletionBackend, CompletionRequest};
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use autocare_core::{AutocareError, AutocareResult};

/// OpenAI-compatible chat completions backend.
///
/// Works with OpenAI, OpenRouter, Groq, Ollama and any other provider that
/// implements the `/v1/chat/completions` API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Build the HTTP client with the configured timeout.
    pub fn new(config: ModelConfig) -> AutocareResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AutocareError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": request.temperature,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.prompt },
            ],
        })
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Content-Type", "application/json");
        let request = if self.config.api_key.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        };

        // OpenRouter wants an app title for attribution
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request.header("X-Title", "autocare")
        } else {
            request
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> AutocareResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let body = self.build_body(request);

        let resp = self
            .add_provider_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AutocareError::Http(e.to_string()))?;

        let status = resp.status();
        // Gateways answer 502/504 with HTML, so the error body is read as text.
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AutocareError::Http(format!(
                "Completion API error {status}: {error_body}"
            )));
        }

        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AutocareError::Http(e.to_string()))?;
        parse_completion(&resp_body)
    }
}

/// Extract the first choice's message text.
pub(crate) fn parse_completion(body: &serde_json::Value) -> AutocareResult<String> {
    let content = body["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .ok_or_else(|| {
            AutocareError::Http(format!("Completion response has no message content: {body}"))
        })?;
    Ok(content.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_completion() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Severity: HIGH\n"}}]
        });
        assert_eq!(parse_completion(&body).unwrap(), "Severity: HIGH");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, AutocareError::Http(_)));
    }

    #[test]
    fn test_request_body() {
        let backend = OpenAiBackend::new(ModelConfig {
            model_id: "gpt-4o-mini".into(),
            max_tokens: 512,
            ..ModelConfig::default()
        })
        .unwrap();
        let body = backend.build_body(&CompletionRequest::new("sys", "hello", 0.7));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }
}
