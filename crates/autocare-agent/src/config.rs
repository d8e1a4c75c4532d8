use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hosted (or local) model provider. All of them speak the OpenAI chat
/// completions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// `api.openai.com`.
    OpenAi,
    /// `openrouter.ai`; requests carry an `X-Title` header.
    OpenRouter,
    /// `api.groq.com`.
    Groq,
    /// Local Ollama server; no API key needed.
    Ollama,
}

/// Model and endpoint settings shared by every agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Defaults to OpenAI.
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,
    /// Model name sent with every request.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Bearer token; may come from `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's default endpoint.
    pub api_base_url: Option<String>,
    /// Default sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on completion length.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request HTTP timeout. `None` waits for as long as the server
    /// takes.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAi
}

fn default_model_id() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model_id: default_model_id(),
            api_key: String::new(),
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: None,
        }
    }
}

impl ModelConfig {
    /// Configured endpoint, or the provider default.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url
        } else {
            match self.provider {
                LlmProvider::OpenAi => "https://api.openai.com",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
                LlmProvider::Ollama => "http://localhost:11434",
            }
        }
    }

    /// Every provider except Ollama needs a key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self.provider, LlmProvider::Ollama)
    }

    /// Per-request HTTP timeout, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Fill gaps from the environment: `OPENAI_API_KEY` when no key is
    /// configured, and `OPENAI_MODEL` / `TEMPERATURE` as overrides.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_empty() {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.api_key = key;
            }
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.is_empty()) {
            self.model_id = model;
        }
        if let Some(temperature) = lookup("TEMPERATURE").and_then(|t| t.parse::<f32>().ok()) {
            self.temperature = temperature;
        }
    }
}
