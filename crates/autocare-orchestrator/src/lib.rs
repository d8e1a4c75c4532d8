//! Task orchestration for the autocare maintenance agents.
//!
//! Accepts typed tasks, queues them in a FIFO, and routes each to the agent
//! registered for its kind, tracking per-agent lifecycle and health.
//!
//! # Main types
//!
//! - [`Orchestrator`]: Registry + queue + single dispatch loop, with start/stop lifecycle.
//! - [`AgentHandle`]: Owns one agent and its status, counters and timestamps.
//! - [`AgentRegistry`]: Registry key to agent handle, in registration order.
//! - [`TaskQueue`]: Unbounded FIFO safe for concurrent submitters.
//! - [`OrchestratorStatus`] / [`HealthReport`]: Aggregate status and health.

/// Orchestrator configuration.
pub mod config;
/// Orchestration engine and dispatch loop.
pub mod engine;
/// Per-agent lifecycle bookkeeping.
pub mod handle;
/// Status and health aggregation.
pub mod monitor;
/// Agent registry and routing.
pub mod registry;
/// FIFO task queue.
pub mod task_queue;
/// Queue entries, outcomes and receipts.
pub mod types;

pub use config::{AgentRegistration, OrchestratorConfig};
pub use engine::Orchestrator;
pub use handle::AgentHandle;
pub use monitor::{HealthReport, OrchestratorStatus, RegisteredAgentStatus};
pub use registry::AgentRegistry;
pub use task_queue::TaskQueue;
pub use types::{QueuedTask, TaskOutcome, TaskReceipt};
