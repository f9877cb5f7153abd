//! Living collection of tasks for the current run
//!
//! Pure state holder keyed by task id. The scheduler is its only writer
//! (bulk replace on a new run, per-task patches at issue and settlement,
//! plus the user-triggered retry path); presenters read snapshots.
//!
//! All writes address tasks by id, never by positional index, so results
//! arriving while the row list is being edited cannot corrupt the wrong row.

use parking_lot::RwLock;
use tracing::warn;

use crate::batch::types::{InvocationResponse, Task, TaskId, TaskStatus};

/// Thread-safe store of the current run's tasks, in original row order.
#[derive(Debug, Default)]
pub struct TaskResultStore {
    tasks: RwLock<Vec<Task>>,
}

impl TaskResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection for a new run. The previous run's tasks
    /// are discarded wholesale.
    pub fn replace_all(&self, tasks: Vec<Task>) {
        *self.tasks.write() = tasks;
    }

    /// Clone of one task by id.
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().iter().find(|t| t.id == id).cloned()
    }

    /// Clone of the full collection, in original row order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    /// Number of tasks in the current run.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// True when the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Transition a task to running at issue time.
    pub fn mark_running(&self, id: TaskId) {
        self.patch(id, |task| {
            task.status = TaskStatus::Running;
            task.error = None;
        });
    }

    /// Settle a task successfully, storing its message id and trace.
    pub fn complete(&self, id: TaskId, response: InvocationResponse) {
        self.patch(id, |task| {
            task.status = TaskStatus::Completed;
            task.message_id = Some(response.message_id);
            task.trace = Some(response.trace);
            task.error = None;
        });
    }

    /// Settle a task with a failure, storing the verbatim error message.
    pub fn fail(&self, id: TaskId, error: String) {
        self.patch(id, |task| {
            task.status = TaskStatus::Failed;
            task.error = Some(error);
        });
    }

    /// Derived completion flag: true only when every task has settled.
    ///
    /// Vacuously true for an empty store, which is what keeps the run
    /// control enabled before the first run.
    pub fn is_all_finished(&self) -> bool {
        self.tasks.read().iter().all(Task::is_settled)
    }

    /// Count of tasks currently in the given status.
    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.tasks.read().iter().filter(|t| t.status == status).count()
    }

    fn patch(&self, id: TaskId, apply: impl FnOnce(&mut Task)) {
        let mut tasks = self.tasks.write();
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => apply(task),
            // A settlement for a task of a discarded run; drop it.
            None => warn!(task_id = id, "patch for unknown task ignored"),
        }
    }
}
