use crate::error::{AutocareError, AutocareResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier assigned to a task at submission time.
pub type TaskId = Uuid;

/// The fixed set of work kinds the orchestrator knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Telemetry anomaly detection.
    DataAnalysis,
    /// Failure prediction with cost estimates.
    Diagnosis,
    /// Service appointment booking.
    Scheduling,
    /// Owner outreach (call scripts).
    CustomerEngagement,
    /// Post-service surveys.
    Feedback,
    /// Fleet-wide failure patterns for the manufacturer.
    ManufacturingInsights,
}

impl TaskKind {
    /// Every kind, in declaration order.
    pub const ALL: [TaskKind; 6] = [
        TaskKind::DataAnalysis,
        TaskKind::Diagnosis,
        TaskKind::Scheduling,
        TaskKind::CustomerEngagement,
        TaskKind::Feedback,
        TaskKind::ManufacturingInsights,
    ];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::DataAnalysis => "data_analysis",
            TaskKind::Diagnosis => "diagnosis",
            TaskKind::Scheduling => "scheduling",
            TaskKind::CustomerEngagement => "customer_engagement",
            TaskKind::Feedback => "feedback",
            TaskKind::ManufacturingInsights => "manufacturing_insights",
        }
    }

    /// Registry key of the agent responsible for this kind.
    ///
    /// This is the fixed kind-to-key routing table; every kind maps to the
    /// key of the same name.
    pub fn registry_key(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = AutocareError;

    fn from_str(s: &str) -> AutocareResult<Self> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AutocareError::InvalidTaskKind(s.to_string()))
    }
}

/// Declared urgency of a task.
///
/// Informational only: the queue is strict FIFO and never reorders by
/// priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Can wait for the next routine service.
    Low,
    /// Default urgency.
    #[default]
    Medium,
    /// Attention needed soon.
    High,
    /// Safety-relevant; act immediately.
    Critical,
}

impl TaskPriority {
    /// Every priority, lowest first.
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Critical,
    ];

    /// Wire name of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }

    /// Ordinal value (low = 1 .. critical = 4).
    pub fn value(self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Critical => 4,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so `High` and `HIGH` both parse.
impl FromStr for TaskPriority {
    type Err = AutocareError;

    fn from_str(s: &str) -> AutocareResult<Self> {
        TaskPriority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AutocareError::InvalidPriority(s.to_string()))
    }
}

/// One unit of work. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    priority: TaskPriority,
    payload: serde_json::Value,
    submitted_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a fresh random id and the current time.
    pub fn new(kind: TaskKind, payload: serde_json::Value, priority: TaskPriority) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            priority,
            payload,
            submitted_at: Utc::now(),
        }
    }

    /// Identifier assigned at creation.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Routing key.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Declared urgency; not used for ordering.
    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Opaque payload; only the target agent interprets it.
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// When the task was created.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Look up a string field of an object payload.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(serde_json::Value::as_str)
    }
}
