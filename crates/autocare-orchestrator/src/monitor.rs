use crate::handle::AgentHandle;
use autocare_core::{AgentSnapshot, AgentStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status of one registered agent, tagged with its registry key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAgentStatus {
    /// Registry key.
    pub agent_type: String,
    /// Result of the agent's health rule.
    pub healthy: bool,
    /// Flattened into the entry when serialized.
    #[serde(flatten)]
    pub snapshot: AgentSnapshot,
}

/// Aggregate view returned by [`crate::Orchestrator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Configured orchestrator name.
    pub orchestrator: String,
    /// Running flag at the time of the snapshot.
    pub orchestrator_running: bool,
    /// Tasks waiting in the queue.
    pub task_queue_size: usize,
    /// Per-agent snapshots in registration order.
    pub agents: Vec<RegisteredAgentStatus>,
}

impl OrchestratorStatus {
    /// Entry for the agent registered under `key`.
    pub fn agent(&self, key: &str) -> Option<&RegisteredAgentStatus> {
        self.agents.iter().find(|a| a.agent_type == key)
    }

    /// Total tasks completed across all agents.
    pub fn total_tasks(&self) -> u64 {
        self.agents.iter().map(|a| a.snapshot.task_count).sum()
    }

    /// Total failures recorded across all agents.
    pub fn total_errors(&self) -> u64 {
        self.agents
            .iter()
            .map(|a| u64::from(a.snapshot.error_count))
            .sum()
    }

    /// Number of agents in each lifecycle state.
    pub fn count_by_status(&self, status: AgentStatus) -> usize {
        self.agents
            .iter()
            .filter(|a| a.snapshot.status == status)
            .count()
    }

    /// Serialize as JSON, with a derived totals block for dashboards.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "orchestrator": self.orchestrator,
            "orchestrator_running": self.orchestrator_running,
            "task_queue_size": self.task_queue_size,
            "agents": self.agents,
            "aggregate": {
                "task_count": self.total_tasks(),
                "error_count": self.total_errors(),
                "running": self.count_by_status(AgentStatus::Running),
                "error": self.count_by_status(AgentStatus::Error),
            },
        })
    }
}

/// Result of an all-agents health check.
///
/// Health is the AND of every agent; one unhealthy agent fails the whole
/// check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `true` only when every agent is healthy.
    pub healthy: bool,
    /// Registry keys of agents that failed the check.
    pub unhealthy: Vec<String>,
}

impl HealthReport {
    /// Evaluate every `(key, handle)` pair.
    pub fn evaluate(entries: &[(String, Arc<AgentHandle>)]) -> Self {
        let unhealthy: Vec<String> = entries
            .iter()
            .filter(|(_, handle)| !handle.healthy())
            .map(|(key, _)| key.clone())
            .collect();
        Self {
            healthy: unhealthy.is_empty(),
            unhealthy,
        }
    }
}

/// Collect per-agent status in the order given.
pub fn collect_agent_status(entries: &[(String, Arc<AgentHandle>)]) -> Vec<RegisteredAgentStatus> {
    entries
        .iter()
        .map(|(key, handle)| RegisteredAgentStatus {
            agent_type: key.clone(),
            healthy: handle.healthy(),
            snapshot: handle.status(),
        })
        .collect()
}
