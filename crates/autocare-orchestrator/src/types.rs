use autocare_core::{AutocareError, AutocareResult, Task, TaskId, TaskKind};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// How a dispatched task ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The agent returned a result.
    Completed {
        /// Value returned by the agent.
        result: serde_json::Value,
    },
    /// The agent raised; the error is also recorded on the agent.
    Failed {
        /// Message of the processing error.
        error: String,
    },
    /// No agent was registered for the task's kind; the task was dropped.
    Unrouted {
        /// Kind that had no registered agent.
        kind: TaskKind,
    },
}

impl TaskOutcome {
    /// `true` for [`TaskOutcome::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed { .. })
    }
}

/// A task waiting in the queue, with an optional reply channel.
#[derive(Debug)]
pub struct QueuedTask {
    /// The submitted task.
    pub task: Task,
    /// Outcome channel; `None` for fire-and-forget submissions.
    pub reply: Option<oneshot::Sender<TaskOutcome>>,
}

impl QueuedTask {
    /// Fire-and-forget entry.
    pub fn detached(task: Task) -> Self {
        Self { task, reply: None }
    }

    /// Entry whose outcome is delivered to the returned receipt.
    pub fn tracked(task: Task) -> (Self, TaskReceipt) {
        let (tx, rx) = oneshot::channel();
        let receipt = TaskReceipt {
            task_id: task.id(),
            rx,
        };
        (
            Self {
                task,
                reply: Some(tx),
            },
            receipt,
        )
    }
}

/// Handle to the outcome of a task submitted with
/// [`crate::Orchestrator::submit_tracked`].
///
/// Dropping the receipt does not affect dispatch.
#[derive(Debug)]
pub struct TaskReceipt {
    task_id: TaskId,
    rx: oneshot::Receiver<TaskOutcome>,
}

impl TaskReceipt {
    /// Id of the submitted task.
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Wait until the dispatch loop has handled the task.
    ///
    /// Fails if the task was discarded without being dispatched (e.g. the
    /// orchestrator was dropped with the task still queued).
    pub async fn wait(self) -> AutocareResult<TaskOutcome> {
        let task_id = self.task_id;
        self.rx.await.map_err(|_| {
            AutocareError::Orchestrator(format!("Task {task_id} was discarded before dispatch"))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use autocare_core::TaskPriority;
    use serde_json::json;

    #[test]
    fn test_outcome_serialization() {
        let outcome = TaskOutcome::Unrouted {
            kind: TaskKind::Feedback,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, json!({"outcome": "unrouted", "kind": "feedback"}));

        let done = TaskOutcome::Completed {
            result: json!({"report": "ok"}),
        };
        assert!(done.is_completed());
        let parsed: TaskOutcome = serde_json::from_value(serde_json::to_value(&done).unwrap()).unwrap();
        assert_eq!(parsed, done);
    }

    #[tokio::test]
    async fn test_receipt_receives_outcome() {
        let task = Task::new(TaskKind::Diagnosis, json!({}), TaskPriority::High);
        let id = task.id();
        let (queued, receipt) = QueuedTask::tracked(task);
        assert_eq!(receipt.task_id(), id);

        queued
            .reply
            .unwrap()
            .send(TaskOutcome::Failed {
                error: "boom".into(),
            })
            .unwrap();
        let outcome = receipt.wait().await.unwrap();
        assert_eq!(
            outcome,
            TaskOutcome::Failed {
                error: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn test_receipt_reports_discarded_task() {
        let task = Task::new(TaskKind::Diagnosis, json!({}), TaskPriority::High);
        let (queued, receipt) = QueuedTask::tracked(task);
        drop(queued);
        let err = receipt.wait().await.unwrap_err();
        assert!(err.to_string().contains("discarded"));
    }
}
