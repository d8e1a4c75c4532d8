use autocare_core::{AutocareError, AutocareResult, TaskKind, DEFAULT_ERROR_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration passed explicitly to [`crate::Orchestrator::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Recorded as the `orchestrator` field on every log event.
    #[serde(default = "default_name")]
    pub name: String,
    /// How long the dispatch loop waits for a task before re-checking the
    /// running flag.
    #[serde(default = "default_queue_wait_ms")]
    pub queue_wait_ms: u64,
    /// Error count at which a running agent reports unhealthy.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
    /// Agents to register at startup, in registration order.
    #[serde(default)]
    pub agents: Vec<AgentRegistration>,
}

fn default_name() -> String {
    "autocare".to_string()
}

fn default_queue_wait_ms() -> u64 {
    1000
}

fn default_error_threshold() -> u32 {
    DEFAULT_ERROR_THRESHOLD
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            queue_wait_ms: default_queue_wait_ms(),
            error_threshold: default_error_threshold(),
            agents: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Parse from TOML and validate.
    pub fn from_toml_str(s: &str) -> AutocareResult<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| AutocareError::Config(format!("Invalid orchestrator config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// `queue_wait_ms` as a [`Duration`].
    pub fn queue_wait(&self) -> Duration {
        Duration::from_millis(self.queue_wait_ms)
    }

    /// Reject values that would stall the loop or make every agent unhealthy.
    pub fn validate(&self) -> AutocareResult<()> {
        if self.queue_wait_ms == 0 {
            return Err(AutocareError::Config(
                "queue_wait_ms must be greater than zero".to_string(),
            ));
        }
        if self.error_threshold == 0 {
            return Err(AutocareError::Config(
                "error_threshold must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder-style override of the queue wait.
    pub fn with_queue_wait(mut self, wait: Duration) -> Self {
        self.queue_wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    /// Builder-style override of the health threshold.
    pub fn with_error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }

    /// Registration list covering every task kind with default keys.
    pub fn register_all_kinds(mut self) -> Self {
        self.agents = TaskKind::ALL
            .into_iter()
            .map(AgentRegistration::for_kind)
            .collect();
        self
    }
}

/// One entry of the startup registration list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistration {
    /// Kind the agent handles.
    pub kind: TaskKind,
    /// Registry key; defaults to the kind's routing key.
    #[serde(default)]
    pub key: Option<String>,
    /// Display name; defaults to the registry key.
    #[serde(default)]
    pub name: Option<String>,
    /// Sampling temperature override for LLM-backed agents.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl AgentRegistration {
    /// Registration with every override left at its default.
    pub fn for_kind(kind: TaskKind) -> Self {
        Self {
            kind,
            key: None,
            name: None,
            temperature: None,
        }
    }

    /// Explicit key, or the kind's routing key.
    pub fn registry_key(&self) -> &str {
        self.key.as_deref().unwrap_or(self.kind.registry_key())
    }

    /// Explicit name, or the registry key.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.registry_key())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.name, "autocare");
        assert_eq!(config.queue_wait(), Duration::from_secs(1));
        assert_eq!(config.error_threshold, 10);
        assert!(config.agents.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_with_agents() {
        let config = OrchestratorConfig::from_toml_str(
            r#"
            name = "workshop"
            queue_wait_ms = 250

            [[agents]]
            kind = "data_analysis"

            [[agents]]
            kind = "diagnosis"
            key = "diagnostics"
            name = "Diagnostic Expert"
            temperature = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "workshop");
        assert_eq!(config.queue_wait_ms, 250);
        assert_eq!(config.error_threshold, 10);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].registry_key(), "data_analysis");
        assert_eq!(config.agents[0].display_name(), "data_analysis");
        assert_eq!(config.agents[1].registry_key(), "diagnostics");
        assert_eq!(config.agents[1].display_name(), "Diagnostic Expert");
        assert_eq!(config.agents[1].temperature, Some(0.2));
    }

    #[test]
    fn test_zero_wait_rejected() {
        let err = OrchestratorConfig::from_toml_str("queue_wait_ms = 0").unwrap_err();
        assert!(matches!(err, AutocareError::Config(_)));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = OrchestratorConfig::default().with_error_threshold(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = OrchestratorConfig::from_toml_str(
            r#"
            [[agents]]
            kind = "valet"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid orchestrator config"));
    }

    #[test]
    fn test_with_queue_wait_never_zero() {
        let config = OrchestratorConfig::default().with_queue_wait(Duration::from_micros(10));
        assert_eq!(config.queue_wait_ms, 1);
    }

    #[test]
    fn test_register_all_kinds() {
        let config = OrchestratorConfig::default().register_all_kinds();
        assert_eq!(config.agents.len(), TaskKind::ALL.len());
        assert_eq!(config.agents[5].registry_key(), "manufacturing_insights");
    }
}
