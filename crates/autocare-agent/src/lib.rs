//! LLM-backed maintenance agents.
//!
//! Each [`MaintenanceAgent`] handles one task kind: it turns the task payload
//! into a prompt, sends it to an OpenAI-compatible completion endpoint, and
//! returns the model's text as the task result.

/// Completion backends.
pub mod backends;
/// Model and provider settings.
pub mod config;
/// Provider-agnostic completion client.
pub mod llm;
/// The per-kind maintenance agent.
pub mod maintenance;
/// Role, goal and backstory per task kind.
pub mod profiles;
/// Prompt builders.
pub mod prompts;
/// Analysis, diagnosis and call-script pipeline.
pub mod workflow;

pub use backends::{CompletionBackend, CompletionRequest};
pub use config::{LlmProvider, ModelConfig};
pub use llm::LlmClient;
pub use maintenance::MaintenanceAgent;
pub use profiles::{default_profiles, profile_for, AgentProfile};
pub use workflow::{MaintenanceWorkflow, WorkflowReport};
