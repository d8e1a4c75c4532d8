//! Core types and error definitions for the autocare workspace.
//!
//! This crate provides the types shared by the agent implementations and the
//! orchestrator: the task record, the agent capability contract, the vehicle
//! data source interface, and the unified error enum.
//!
//! # Main types
//!
//! - [`AutocareError`]: Unified error enum for all autocare crates.
//! - [`AutocareResult`]: Convenience alias for `Result<T, AutocareError>`.
//! - [`Task`]: Immutable unit of work with a kind, priority and payload.
//! - [`Agent`]: Capability contract implemented by every concrete agent.
//! - [`AgentSnapshot`]: Read-only projection of an agent's status and counters.
//! - [`VehicleSource`]: Read-only vehicle lookup used by the agents.

/// Agent capability contract and status model.
pub mod agent;
/// Error types.
pub mod error;
/// Task record.
pub mod task;
/// Vehicle records and data sources.
pub mod vehicle;

pub use agent::{Agent, AgentIdentity, AgentSnapshot, AgentStatus, DEFAULT_ERROR_THRESHOLD};
pub use error::{AutocareError, AutocareResult};
pub use task::{Task, TaskId, TaskKind, TaskPriority};
pub use vehicle::{InMemoryFleet, Powertrain, VehicleRecord, VehicleSource};
