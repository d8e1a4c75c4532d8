use autocare_core::{
    Agent, AgentIdentity, AgentSnapshot, AgentStatus, AutocareError, AutocareResult, Task,
    DEFAULT_ERROR_THRESHOLD,
};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, error, info};

/// Owns one agent and its lifecycle bookkeeping.
///
/// State machine: `idle --start--> running`, `running --stop--> idle`,
/// `running --failure--> error`, `error --reset--> running`. A fresh
/// `start()` from `error` is also allowed.
///
/// The snapshot lock is never held across an await, so [`AgentHandle::status`]
/// can be read while a task is in flight.
pub struct AgentHandle {
    agent: Box<dyn Agent>,
    state: RwLock<AgentSnapshot>,
    error_threshold: u32,
}

impl AgentHandle {
    /// Wrap `agent` with the default error threshold.
    pub fn new(agent: Box<dyn Agent>) -> Self {
        Self::with_error_threshold(agent, DEFAULT_ERROR_THRESHOLD)
    }

    /// Wrap `agent`; it stays healthy while fewer than `error_threshold`
    /// failures are counted.
    pub fn with_error_threshold(agent: Box<dyn Agent>, error_threshold: u32) -> Self {
        let state = RwLock::new(AgentSnapshot::new(agent.identity()));
        Self {
            agent,
            state,
            error_threshold,
        }
    }

    /// Static identity of the wrapped agent.
    pub fn identity(&self) -> &AgentIdentity {
        self.agent.identity()
    }

    fn name(&self) -> &str {
        &self.agent.identity().name
    }

    /// Initialize the agent and mark it running.
    ///
    /// On failure the status is left unchanged and an
    /// [`AutocareError::AgentStart`] is returned.
    pub async fn start(&self) -> AutocareResult<()> {
        if self.state.read().status == AgentStatus::Running {
            debug!(agent = %self.name(), "Agent already running");
            return Ok(());
        }

        info!(agent = %self.name(), "Starting agent");
        self.agent
            .initialize()
            .await
            .map_err(|e| AutocareError::AgentStart {
                agent: self.name().to_string(),
                reason: e.to_string(),
            })?;

        self.state.write().status = AgentStatus::Running;
        info!(agent = %self.name(), "Agent is now running");
        Ok(())
    }

    /// Mark the agent idle, then release its resources.
    ///
    /// Stopping an idle agent is a no-op.
    pub async fn stop(&self) -> AutocareResult<()> {
        {
            let mut state = self.state.write();
            if state.status == AgentStatus::Idle {
                debug!(agent = %self.name(), "Agent already stopped");
                return Ok(());
            }
            state.status = AgentStatus::Idle;
        }

        info!(agent = %self.name(), "Stopping agent");
        self.agent
            .shutdown()
            .await
            .map_err(|e| AutocareError::AgentStop {
                agent: self.name().to_string(),
                reason: e.to_string(),
            })?;
        info!(agent = %self.name(), "Agent stopped");
        Ok(())
    }

    /// Run one task through the agent.
    ///
    /// Success bumps `task_count` and `last_activity`. A failure is recorded
    /// via [`AgentHandle::handle_error`] and then returned to the caller.
    pub async fn process(&self, task: &Task) -> AutocareResult<serde_json::Value> {
        match self.agent.process_task(task).await {
            Ok(result) => {
                let mut state = self.state.write();
                state.last_activity = Utc::now();
                state.task_count += 1;
                Ok(result)
            }
            Err(e) => {
                let err = AutocareError::processing(self.name(), e);
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    /// Count a failure. Only a `running` agent moves to `error`; a task that
    /// finishes after `stop()` leaves the agent `idle`.
    pub fn handle_error(&self, err: &AutocareError) {
        let error_count = {
            let mut state = self.state.write();
            state.error_count = state.error_count.saturating_add(1);
            if state.status == AgentStatus::Running {
                state.status = AgentStatus::Error;
            }
            state.error_count
        };
        error!(agent = %self.name(), error_count, error = %err, "Agent error");
    }

    /// Recover from `error`: back to `running` with the error count cleared.
    pub fn reset(&self) -> AutocareResult<()> {
        let mut state = self.state.write();
        if state.status != AgentStatus::Error {
            return Err(AutocareError::InvalidTransition {
                agent: self.name().to_string(),
                from: state.status.to_string(),
                to: AgentStatus::Running.to_string(),
            });
        }
        state.status = AgentStatus::Running;
        state.error_count = 0;
        info!(agent = %self.name(), "Agent reset after errors");
        Ok(())
    }

    /// Point-in-time copy of the lifecycle state.
    pub fn status(&self) -> AgentSnapshot {
        self.state.read().clone()
    }

    /// `running` with the error count under the threshold.
    pub fn healthy(&self) -> bool {
        self.state.read().is_healthy(self.error_threshold)
    }

    /// Failure count at which the agent reports unhealthy.
    pub fn error_threshold(&self) -> u32 {
        self.error_threshold
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("identity", self.identity())
            .field("state", &*self.state.read())
            .field("error_threshold", &self.error_threshold)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autocare_core::{TaskKind, TaskPriority};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock agent with switchable failures and a shutdown counter.
    struct MockAgent {
        identity: AgentIdentity,
        fail_init: bool,
        fail_process: Arc<AtomicBool>,
        shutdowns: Arc<AtomicUsize>,
    }

    impl MockAgent {
        fn new(name: &str) -> Self {
            Self {
                identity: AgentIdentity::new(format!("{name}-1"), name),
                fail_init: false,
                fail_process: Arc::new(AtomicBool::new(false)),
                shutdowns: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Agent for MockAgent {
        fn identity(&self) -> &AgentIdentity {
            &self.identity
        }

        async fn initialize(&self) -> AutocareResult<()> {
            if self.fail_init {
                return Err(AutocareError::Config("missing api key".into()));
            }
            Ok(())
        }

        async fn process_task(&self, task: &Task) -> AutocareResult<serde_json::Value> {
            if self.fail_process.load(Ordering::SeqCst) {
                return Err(AutocareError::Http("upstream 500".into()));
            }
            Ok(task.payload().clone())
        }

        async fn shutdown(&self) -> AutocareResult<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn task() -> Task {
        Task::new(TaskKind::DataAnalysis, json!({"x": 1}), TaskPriority::Medium)
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mock = MockAgent::new("analysis");
        let shutdowns = mock.shutdowns.clone();
        let handle = AgentHandle::new(Box::new(mock));
        assert_eq!(handle.status().status, AgentStatus::Idle);

        handle.start().await.unwrap();
        assert_eq!(handle.status().status, AgentStatus::Running);
        assert!(handle.healthy());

        handle.stop().await.unwrap();
        assert_eq!(handle.status().status, AgentStatus::Idle);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mock = MockAgent::new("analysis");
        let shutdowns = mock.shutdowns.clone();
        let handle = AgentHandle::new(Box::new(mock));

        handle.stop().await.unwrap();
        handle.start().await.unwrap();
        handle.stop().await.unwrap();
        handle.stop().await.unwrap();
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_initialize_stays_idle() {
        let mut mock = MockAgent::new("diagnosis");
        mock.fail_init = true;
        let handle = AgentHandle::new(Box::new(mock));

        let err = handle.start().await.unwrap_err();
        assert!(matches!(err, AutocareError::AgentStart { ref agent, .. } if agent == "diagnosis"));
        assert_eq!(handle.status().status, AgentStatus::Idle);
        assert!(!handle.healthy());
    }

    #[tokio::test]
    async fn test_process_updates_counters() {
        let handle = AgentHandle::new(Box::new(MockAgent::new("analysis")));
        handle.start().await.unwrap();
        let before = handle.status().last_activity;

        let result = handle.process(&task()).await.unwrap();
        assert_eq!(result, json!({"x": 1}));

        let status = handle.status();
        assert_eq!(status.task_count, 1);
        assert_eq!(status.error_count, 0);
        assert!(status.last_activity >= before);
    }

    #[tokio::test]
    async fn test_process_failure_is_recorded_and_returned() {
        let mock = MockAgent::new("analysis");
        let fail = mock.fail_process.clone();
        let handle = AgentHandle::new(Box::new(mock));
        handle.start().await.unwrap();
        fail.store(true, Ordering::SeqCst);

        let err = handle.process(&task()).await.unwrap_err();
        assert!(matches!(err, AutocareError::AgentProcessing { .. }));
        assert!(err.to_string().contains("upstream 500"));

        let status = handle.status();
        assert_eq!(status.status, AgentStatus::Error);
        assert_eq!(status.error_count, 1);
        assert_eq!(status.task_count, 0);
        assert!(!handle.healthy());
    }

    #[tokio::test]
    async fn test_failure_while_idle_counts_without_error_status() {
        let mock = MockAgent::new("analysis");
        let fail = mock.fail_process.clone();
        let shutdowns = mock.shutdowns.clone();
        let handle = AgentHandle::new(Box::new(mock));
        fail.store(true, Ordering::SeqCst);

        handle.process(&task()).await.unwrap_err();
        let status = handle.status();
        assert_eq!(status.status, AgentStatus::Idle);
        assert_eq!(status.error_count, 1);

        handle.stop().await.unwrap();
        assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_agent_still_processes() {
        let mock = MockAgent::new("analysis");
        let fail = mock.fail_process.clone();
        let handle = AgentHandle::new(Box::new(mock));
        handle.start().await.unwrap();

        fail.store(true, Ordering::SeqCst);
        let _ = handle.process(&task()).await;
        fail.store(false, Ordering::SeqCst);

        handle.process(&task()).await.unwrap();
        let status = handle.status();
        assert_eq!(status.task_count, 1);
        assert_eq!(status.status, AgentStatus::Error);
    }

    #[tokio::test]
    async fn test_reset_from_error() {
        let mock = MockAgent::new("analysis");
        let fail = mock.fail_process.clone();
        let handle = AgentHandle::new(Box::new(mock));
        handle.start().await.unwrap();
        fail.store(true, Ordering::SeqCst);
        let _ = handle.process(&task()).await;

        handle.reset().unwrap();
        let status = handle.status();
        assert_eq!(status.status, AgentStatus::Running);
        assert_eq!(status.error_count, 0);
        assert!(handle.healthy());
    }

    #[tokio::test]
    async fn test_reset_rejected_outside_error() {
        let handle = AgentHandle::new(Box::new(MockAgent::new("analysis")));
        let err = handle.reset().unwrap_err();
        assert!(matches!(
            err,
            AutocareError::InvalidTransition { ref from, .. } if from == "idle"
        ));
    }

    #[tokio::test]
    async fn test_restart_from_error() {
        let mock = MockAgent::new("analysis");
        let fail = mock.fail_process.clone();
        let handle = AgentHandle::new(Box::new(mock));
        handle.start().await.unwrap();
        fail.store(true, Ordering::SeqCst);
        let _ = handle.process(&task()).await;

        handle.start().await.unwrap();
        let status = handle.status();
        assert_eq!(status.status, AgentStatus::Running);
        assert_eq!(status.error_count, 1);
    }

    #[tokio::test]
    async fn test_threshold_applies() {
        let mock = MockAgent::new("analysis");
        let fail = mock.fail_process.clone();
        let handle = AgentHandle::with_error_threshold(Box::new(mock), 2);
        handle.start().await.unwrap();

        fail.store(true, Ordering::SeqCst);
        let _ = handle.process(&task()).await;
        handle.reset().unwrap();
        assert!(handle.healthy());

        let _ = handle.process(&task()).await;
        let _ = handle.process(&task()).await;
        handle.start().await.unwrap();
        assert_eq!(handle.status().status, AgentStatus::Running);
        assert_eq!(handle.status().error_count, 2);
        assert!(!handle.healthy());
    }
}
