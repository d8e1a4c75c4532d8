use crate::config::OrchestratorConfig;
use crate::handle::AgentHandle;
use crate::monitor::{collect_agent_status, HealthReport, OrchestratorStatus};
use crate::registry::AgentRegistry;
use crate::task_queue::TaskQueue;
use crate::types::{QueuedTask, TaskOutcome, TaskReceipt};
use autocare_core::{
    Agent, AgentSnapshot, AutocareError, AutocareResult, Task, TaskId, TaskKind, TaskPriority,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Owns the agent registry, the task queue and the dispatch loop.
///
/// Tasks are submitted fire-and-forget and handled by a single consumer loop
/// ([`Orchestrator::process_tasks`]) strictly one at a time, in submission
/// order. Failures are contained per task: an agent error or a missing route
/// is logged and the loop moves on.
pub struct Orchestrator {
    config: OrchestratorConfig,
    registry: RwLock<AgentRegistry>,
    queue: TaskQueue,
    running: AtomicBool,
    dispatcher_active: AtomicBool,
}

impl Orchestrator {
    /// Create an orchestrator with an empty registry and queue.
    pub fn new(config: OrchestratorConfig) -> Self {
        info!(orchestrator = %config.name, "Orchestrator initialized");
        Self {
            config,
            registry: RwLock::new(AgentRegistry::new()),
            queue: TaskQueue::new(),
            running: AtomicBool::new(false),
            dispatcher_active: AtomicBool::new(false),
        }
    }

    /// Configuration the orchestrator was built with.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    /// Register `agent` under `key`. A later registration for the same key
    /// replaces the earlier one.
    pub async fn register(&self, key: impl Into<String>, agent: Box<dyn Agent>) {
        let key = key.into();
        let handle = AgentHandle::with_error_threshold(agent, self.config.error_threshold);
        let replaced = self.registry.write().await.register(key.clone(), handle);
        match replaced {
            Some(old) => warn!(
                orchestrator = %self.name(),
                agent = %key,
                replaced = %old.identity().id,
                "Replaced registered agent"
            ),
            None => info!(orchestrator = %self.name(), agent = %key, "Registered agent"),
        }
    }

    async fn entries(&self) -> Vec<(String, Arc<AgentHandle>)> {
        self.registry.read().await.entries()
    }

    /// Start every registered agent in registration order.
    ///
    /// One agent failing to start does not stop the others; the failures are
    /// logged and returned. The running flag is set after all attempts.
    pub async fn start_all(&self) -> Vec<AutocareError> {
        info!(orchestrator = %self.name(), "Starting all agents");
        let mut errors = Vec::new();
        for (key, handle) in self.entries().await {
            match handle.start().await {
                Ok(()) => info!(orchestrator = %self.name(), agent = %key, "Started agent"),
                Err(e) => {
                    error!(orchestrator = %self.name(), agent = %key, error = %e, "Failed to start agent");
                    errors.push(e);
                }
            }
        }
        self.running.store(true, Ordering::SeqCst);
        info!(
            orchestrator = %self.name(),
            failed = errors.len(),
            "Agent startup complete"
        );
        errors
    }

    /// Clear the running flag, then stop every agent in registration order.
    ///
    /// The dispatch loop exits after its current wait or task. Stop failures
    /// are logged and returned; they never block stopping the rest.
    pub async fn stop_all(&self) -> Vec<AutocareError> {
        info!(orchestrator = %self.name(), "Stopping all agents");
        self.running.store(false, Ordering::SeqCst);

        let mut errors = Vec::new();
        for (key, handle) in self.entries().await {
            match handle.stop().await {
                Ok(()) => info!(orchestrator = %self.name(), agent = %key, "Stopped agent"),
                Err(e) => {
                    error!(orchestrator = %self.name(), agent = %key, error = %e, "Failed to stop agent");
                    errors.push(e);
                }
            }
        }
        info!(orchestrator = %self.name(), "All agents stopped");
        errors
    }

    /// Whether `start_all` ran more recently than `stop_all`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Enqueue a new task and return its id without waiting for processing.
    pub fn submit(&self, kind: TaskKind, payload: serde_json::Value, priority: TaskPriority) -> TaskId {
        self.submit_task(Task::new(kind, payload, priority))
    }

    /// Enqueue an already-built task.
    pub fn submit_task(&self, task: Task) -> TaskId {
        let id = task.id();
        info!(
            orchestrator = %self.name(),
            task_id = %id,
            kind = %task.kind(),
            priority = %task.priority(),
            "Task submitted"
        );
        self.queue.push(QueuedTask::detached(task));
        id
    }

    /// Enqueue a new task and get a receipt that resolves to its outcome.
    pub fn submit_tracked(
        &self,
        kind: TaskKind,
        payload: serde_json::Value,
        priority: TaskPriority,
    ) -> TaskReceipt {
        let task = Task::new(kind, payload, priority);
        info!(
            orchestrator = %self.name(),
            task_id = %task.id(),
            kind = %kind,
            priority = %priority,
            "Tracked task submitted"
        );
        let (queued, receipt) = QueuedTask::tracked(task);
        self.queue.push(queued);
        receipt
    }

    /// Tasks waiting for dispatch; the one in flight is not counted.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Run the dispatch loop until the running flag is cleared.
    ///
    /// Waits up to the configured queue wait for each task, then re-checks
    /// the flag. Only one loop may be active per orchestrator.
    pub async fn process_tasks(&self) -> AutocareResult<()> {
        if self
            .dispatcher_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AutocareError::Orchestrator(format!(
                "Dispatch loop already active for '{}'",
                self.name()
            )));
        }
        let _active = ActiveGuard(&self.dispatcher_active);

        let wait = self.config.queue_wait();
        info!(orchestrator = %self.name(), "Dispatch loop started");
        while self.is_running() {
            if let Some(queued) = self.queue.pop_timeout(wait).await {
                self.dispatch(queued).await;
            }
        }
        info!(orchestrator = %self.name(), "Dispatch loop stopped");
        Ok(())
    }

    /// Spawn [`Orchestrator::process_tasks`] on the current runtime.
    pub fn spawn_dispatcher(self: &Arc<Self>) -> JoinHandle<AutocareResult<()>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.process_tasks().await })
    }

    /// Route one task and wait for its agent. Never fails: every outcome is
    /// logged and reported to the receipt, if any.
    async fn dispatch(&self, queued: QueuedTask) {
        let QueuedTask { task, reply } = queued;
        let route = self.registry.read().await.route(task.kind());

        let outcome = match route {
            Ok((key, handle)) => {
                info!(
                    orchestrator = %self.name(),
                    task_id = %task.id(),
                    agent = %key,
                    "Routing task"
                );
                match handle.process(&task).await {
                    Ok(result) => {
                        info!(orchestrator = %self.name(), task_id = %task.id(), "Task completed");
                        TaskOutcome::Completed { result }
                    }
                    Err(e) => {
                        error!(
                            orchestrator = %self.name(),
                            task_id = %task.id(),
                            agent = %key,
                            error = %e,
                            "Task failed"
                        );
                        TaskOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                error!(
                    orchestrator = %self.name(),
                    task_id = %task.id(),
                    error = %e,
                    "Dropping task"
                );
                TaskOutcome::Unrouted { kind: task.kind() }
            }
        };

        if let Some(reply) = reply {
            // The submitter may have dropped its receipt.
            let _ = reply.send(outcome);
        }
    }

    /// Running flag, queue length and per-agent snapshots.
    pub async fn status(&self) -> OrchestratorStatus {
        let entries = self.entries().await;
        OrchestratorStatus {
            orchestrator: self.name().to_string(),
            orchestrator_running: self.is_running(),
            task_queue_size: self.queue.len(),
            agents: collect_agent_status(&entries),
        }
    }

    /// Health of every agent, naming the unhealthy ones.
    pub async fn health_report(&self) -> HealthReport {
        let report = HealthReport::evaluate(&self.entries().await);
        for key in &report.unhealthy {
            warn!(orchestrator = %self.name(), agent = %key, "Agent is unhealthy");
        }
        report
    }

    /// True only if every registered agent is healthy.
    pub async fn health_check(&self) -> bool {
        self.health_report().await.healthy
    }

    /// Move the agent registered under `key` out of the error state.
    pub async fn reset_agent(&self, key: &str) -> AutocareResult<()> {
        let handle = self.registry.read().await.get(key).ok_or_else(|| {
            AutocareError::Orchestrator(format!("No agent registered under '{key}'"))
        })?;
        handle.reset()
    }

    /// Snapshot of the agent registered under `key`.
    pub async fn agent_status(&self, key: &str) -> Option<AgentSnapshot> {
        self.registry.read().await.get(key).map(|h| h.status())
    }

    /// Registry keys in registration order.
    pub async fn agent_keys(&self) -> Vec<String> {
        self.registry
            .read()
            .await
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Number of registered agents.
    pub async fn agent_count(&self) -> usize {
        self.registry.read().await.len()
    }
}

/// Clears the single-consumer flag when the loop exits, however it exits.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
