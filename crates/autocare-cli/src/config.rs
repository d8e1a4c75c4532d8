use autocare_agent::ModelConfig;
use autocare_orchestrator::{AgentRegistration, OrchestratorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level `autocare.toml`.
#[derive(Debug, Deserialize)]
pub struct AutocareConfig {
    /// Model and provider settings (`[model]`).
    #[serde(default)]
    pub model: ModelConfig,
    /// Queue, health and registration settings (`[orchestrator]`).
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// JSON fleet file, relative to the config file's directory.
    #[serde(default = "default_fleet_path")]
    pub fleet_path: PathBuf,
}

fn default_fleet_path() -> PathBuf {
    PathBuf::from("fleet.json")
}

impl AutocareConfig {
    /// Parse and validate.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.orchestrator.validate()?;
        Ok(config)
    }

    /// Read and parse the file at `path`.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {e}", path.display())
        })?;
        Self::from_toml_str(&raw)
    }

    /// Fill model settings from the process environment.
    pub fn apply_env(&mut self) {
        self.model.apply_env(|key| std::env::var(key).ok());
    }

    /// Fleet file location, resolved against the config file's directory.
    pub fn fleet_path(&self, config_path: &Path) -> PathBuf {
        if self.fleet_path.is_absolute() {
            return self.fleet_path.clone();
        }
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.fleet_path)
    }

    /// Agents to register; every kind when none are listed.
    pub fn registrations(&self) -> Vec<AgentRegistration> {
        if self.orchestrator.agents.is_empty() {
            self.orchestrator.clone().register_all_kinds().agents
        } else {
            self.orchestrator.agents.clone()
        }
    }
}
