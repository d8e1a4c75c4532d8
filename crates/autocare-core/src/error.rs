use thiserror::Error;

/// A convenience `Result` alias using [`AutocareError`].
pub type AutocareResult<T> = Result<T, AutocareError>;

/// Top-level error type for the autocare workspace.
///
/// Lifecycle and routing variants are contained at the boundary where they
/// occur: the orchestrator logs them and keeps going.
#[derive(Error, Debug)]
pub enum AutocareError {
    /// An agent failed to acquire its resources during `start()`.
    #[error("Agent '{agent}' failed to start: {reason}")]
    AgentStart {
        /// Name of the agent.
        agent: String,
        /// Message of the underlying failure.
        reason: String,
    },

    /// An agent failed to release its resources during `stop()`.
    #[error("Agent '{agent}' failed to stop: {reason}")]
    AgentStop {
        /// Name of the agent.
        agent: String,
        /// Message of the underlying failure.
        reason: String,
    },

    /// An agent raised while processing a task.
    #[error("Agent '{agent}' failed to process task: {reason}")]
    AgentProcessing {
        /// Name of the agent.
        agent: String,
        /// Message of the underlying failure.
        reason: String,
    },

    /// No registered agent handles the task's kind.
    #[error("No agent registered for task kind '{kind}'")]
    RouteNotFound {
        /// Wire name of the unrouted kind.
        kind: String,
    },

    /// A lifecycle operation was called from a state that does not allow it.
    #[error("Agent '{agent}' cannot transition from {from} to {to}")]
    InvalidTransition {
        /// Name of the agent.
        agent: String,
        /// Current state.
        from: String,
        /// Requested state.
        to: String,
    },

    /// A task kind string did not name any known kind.
    #[error("Unknown task kind: {0}")]
    InvalidTaskKind(String),

    /// A priority string did not name any known priority.
    #[error("Unknown task priority: {0} (expected low, medium, high, critical)")]
    InvalidPriority(String),

    /// A task payload lacks a field its agent needs, or has the wrong shape.
    #[error("Invalid task payload: {0}")]
    InvalidPayload(String),

    /// The vehicle data source has no record for the identifier.
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    /// An error from an outbound HTTP request (e.g. LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the orchestrator itself (not from one of its agents).
    #[error("Orchestrator error: {0}")]
    Orchestrator(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AutocareError {
    /// Wrap any failure raised inside `process_task` as an
    /// [`AutocareError::AgentProcessing`] for the named agent.
    ///
    /// Errors that already are processing failures pass through unchanged.
    pub fn processing(agent: impl Into<String>, err: AutocareError) -> Self {
        match err {
            e @ AutocareError::AgentProcessing { .. } => e,
            other => AutocareError::AgentProcessing {
                agent: agent.into(),
                reason: other.to_string(),
            },
        }
    }
}
