use crate::error::AutocareResult;
use crate::task::Task;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error count at which a running agent stops reporting healthy.
pub const DEFAULT_ERROR_THRESHOLD: u32 = 10;

/// Stable id/name pair of an agent, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Unique per registration, e.g. `diagnosis-1a2b3c4d`.
    pub id: String,
    /// Human-readable name used in logs and errors.
    pub name: String,
}

impl AgentIdentity {
    /// Identity with an explicit id.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Identity with a generated id of the form `<name>-<8 hex chars>`.
    pub fn generate(name: impl Into<String>) -> Self {
        let name = name.into();
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{name}-{}", &suffix[..8]),
            name,
        }
    }
}

/// Lifecycle state of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Registered but not started, or stopped.
    #[default]
    Idle,
    /// Started and accepting tasks.
    Running,
    /// Failed while running; still routed to, but unhealthy.
    Error,
    /// Waiting on an external dependency; never entered by the orchestrator.
    Blocked,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Running => "running",
            AgentStatus::Error => "error",
            AgentStatus::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// Read-only projection of an agent's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Id from the agent's identity.
    pub agent_id: String,
    /// Name from the agent's identity.
    pub agent_name: String,
    /// Current lifecycle state.
    pub status: AgentStatus,
    /// When the handle was created.
    pub created_at: DateTime<Utc>,
    /// Last successful task, or `created_at` before any.
    pub last_activity: DateTime<Utc>,
    /// Tasks processed successfully.
    pub task_count: u64,
    /// Failures recorded since creation or the last reset.
    pub error_count: u32,
}

impl AgentSnapshot {
    /// Fresh idle snapshot with zeroed counters.
    pub fn new(identity: &AgentIdentity) -> Self {
        let now = Utc::now();
        Self {
            agent_id: identity.id.clone(),
            agent_name: identity.name.clone(),
            status: AgentStatus::Idle,
            created_at: now,
            last_activity: now,
            task_count: 0,
            error_count: 0,
        }
    }

    /// Running with fewer than `error_threshold` recorded failures.
    pub fn is_healthy(&self, error_threshold: u32) -> bool {
        self.status == AgentStatus::Running && self.error_count < error_threshold
    }
}

/// Capability contract every concrete agent implements.
///
/// Lifecycle bookkeeping (status, counters, timestamps) is kept by the
/// orchestrator's agent handle; implementations only do the agent-specific
/// work and must not touch orchestrator state.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identity of this agent.
    fn identity(&self) -> &AgentIdentity;

    /// Acquire resources (model clients, connections). Errors are reported
    /// to the caller, never swallowed.
    async fn initialize(&self) -> AutocareResult<()>;

    /// Perform one unit of work and return its result.
    async fn process_task(&self, task: &Task) -> AutocareResult<serde_json::Value>;

    /// Release resources. Must be idempotent.
    async fn shutdown(&self) -> AutocareResult<()>;
}
