use crate::backends::{CompletionBackend, CompletionRequest};
use crate::config::ModelConfig;
use crate::llm::LlmClient;
use crate::profiles::{profile_for, AgentProfile};
use crate::prompts::build_prompt;
use async_trait::async_trait;
use autocare_core::{
    Agent, AgentIdentity, AutocareError, AutocareResult, Task, TaskKind, VehicleSource,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// LLM-backed agent for one maintenance task kind.
///
/// The completion client is created in [`Agent::initialize`] and dropped in
/// [`Agent::shutdown`]; processing before initialization fails.
pub struct MaintenanceAgent {
    identity: AgentIdentity,
    profile: AgentProfile,
    model: ModelConfig,
    temperature: Option<f32>,
    fleet: Option<Arc<dyn VehicleSource>>,
    backend: Option<Arc<dyn CompletionBackend>>,
    client: Mutex<Option<LlmClient>>,
}

impl MaintenanceAgent {
    /// Agent for `kind` using the kind's default profile.
    pub fn new(kind: TaskKind, model: ModelConfig) -> Self {
        Self {
            identity: AgentIdentity::generate(kind.as_str()),
            profile: profile_for(kind),
            model,
            temperature: None,
            fleet: None,
            backend: None,
            client: Mutex::new(None),
        }
    }

    /// Resolve `vehicle_id` payload fields against this source.
    pub fn with_fleet(mut self, fleet: Arc<dyn VehicleSource>) -> Self {
        self.fleet = Some(fleet);
        self
    }

    /// Use a pre-built completion backend instead of the HTTP one. No API key
    /// is required in that case.
    pub fn with_backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Rename the agent; the id is regenerated from the new name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.identity = AgentIdentity::generate(name);
        self
    }

    /// Override the profile's sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Task kind this agent accepts.
    pub fn kind(&self) -> TaskKind {
        self.profile.kind
    }

    /// Persona used for the system prompt.
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Effective temperature: the override, the profile, then the model default.
    pub fn temperature(&self) -> f32 {
        self.temperature
            .unwrap_or_else(|| self.profile.temperature_for(&self.model))
    }

    /// `true` between `initialize` and `shutdown`.
    pub fn is_initialized(&self) -> bool {
        self.client.lock().is_some()
    }

    /// Run the model on `task` and return its text answer.
    pub async fn generate(&self, task: &Task) -> AutocareResult<String> {
        if task.kind() != self.profile.kind {
            return Err(self.failure(format!(
                "handles {} tasks, got {}",
                self.profile.kind,
                task.kind()
            )));
        }

        let client = self
            .client
            .lock()
            .clone()
            .ok_or_else(|| self.failure("not initialized".to_string()))?;

        let today = chrono::Local::now().date_naive();
        let prompt = build_prompt(task, self.fleet.as_deref(), today)?;
        let request = CompletionRequest::new(self.profile.system_prompt(), prompt, self.temperature());

        debug!(
            agent = %self.identity.id,
            task_id = %task.id(),
            temperature = request.temperature,
            "Sending completion request"
        );
        let report = client.complete(&request).await?;
        info!(
            agent = %self.identity.id,
            task_id = %task.id(),
            chars = report.len(),
            "Completion received"
        );
        Ok(report)
    }

    fn failure(&self, reason: String) -> AutocareError {
        AutocareError::AgentProcessing {
            agent: self.identity.id.clone(),
            reason,
        }
    }
}

#[async_trait]
impl Agent for MaintenanceAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    async fn initialize(&self) -> AutocareResult<()> {
        let client = match &self.backend {
            Some(backend) => LlmClient::from_backend(Arc::clone(backend)),
            None => {
                if self.model.requires_api_key() && self.model.api_key.is_empty() {
                    return Err(AutocareError::Config(format!(
                        "no API key configured for provider {:?}",
                        self.model.provider
                    )));
                }
                LlmClient::new(self.model.clone())?
            }
        };
        *self.client.lock() = Some(client);
        debug!(agent = %self.identity.id, model = %self.model.model_id, "Agent initialized");
        Ok(())
    }

    async fn process_task(&self, task: &Task) -> AutocareResult<serde_json::Value> {
        let report = self.generate(task).await?;
        let mut result = serde_json::json!({
            "agent": self.identity.name,
            "kind": task.kind(),
            "task_id": task.id(),
            "report": report,
        });
        if let Some(vehicle_id) = task.payload_str("vehicle_id") {
            result["vehicle_id"] = serde_json::Value::from(vehicle_id);
        }
        Ok(result)
    }

    async fn shutdown(&self) -> AutocareResult<()> {
        self.client.lock().take();
        Ok(())
    }
}
