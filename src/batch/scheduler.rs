//! Grouped batch scheduler
//!
//! Partitions validated rows into consecutive groups of at most
//! [`GROUP_SIZE`], issues a group's invocations concurrently, and awaits
//! the settlement of every invocation in the group before starting the
//! next. The group boundary is a hard synchronization point chosen to stay
//! under the remote endpoint's requests-per-minute ceiling, not a
//! best-effort throttle.
//!
//! An individual task failure never aborts its group or later groups; it is
//! recorded per row and retried only by explicit user action.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::batch::store::TaskResultStore;
use crate::batch::types::{
    InvocationRequest, Task, TaskId, TaskInvoker, TaskStatus, GROUP_SIZE,
};
use crate::schema::VariableSchema;
use crate::table::TableRow;

/// Scheduler refusal and retry errors; messages are user-facing notices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The validated table has no rows
    #[error("no rows to run, upload or edit the table first")]
    NoRows,

    /// A previous run still has unsettled tasks
    #[error("a batch run is already in progress")]
    RunInFlight,

    /// Retry target does not exist in the current run
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// Retry target has not failed
    #[error("task {0} is not in a failed state")]
    NotRetryable(TaskId),
}

/// Outcome counts of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks created
    pub total: usize,
    /// Tasks that settled successfully
    pub completed: usize,
    /// Tasks that settled with an error
    pub failed: usize,
    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

/// Executes batch runs against a [`TaskInvoker`], maintaining one task per
/// row in the shared [`TaskResultStore`].
pub struct BatchScheduler {
    invoker: Arc<dyn TaskInvoker>,
    store: Arc<TaskResultStore>,
    group_size: usize,
}

impl BatchScheduler {
    /// Create a scheduler over the given invoker and store, using the
    /// default [`GROUP_SIZE`] cap.
    pub fn new(invoker: Arc<dyn TaskInvoker>, store: Arc<TaskResultStore>) -> Self {
        Self {
            invoker,
            store,
            group_size: GROUP_SIZE,
        }
    }

    /// Override the group size. Mainly for tests; production runs keep the
    /// [`GROUP_SIZE`] cap.
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size.max(1);
        self
    }

    /// The store this scheduler writes to.
    pub fn store(&self) -> &Arc<TaskResultStore> {
        &self.store
    }

    /// Execute one batch run over validated rows.
    ///
    /// Refuses to start when `rows` is empty or while a previous run has
    /// unsettled tasks, taking no other action in either case. Otherwise
    /// replaces the store wholesale with one pending task per row (in
    /// original row order, id = row key) and drives the grouped fan-out to
    /// completion.
    #[instrument(skip(self, rows, schema), fields(row_count = rows.len()))]
    pub async fn run(
        &self,
        rows: &[TableRow],
        schema: &VariableSchema,
    ) -> Result<RunSummary, RunError> {
        if rows.is_empty() {
            warn!("refusing batch run without rows");
            return Err(RunError::NoRows);
        }
        if !self.store.is_all_finished() {
            warn!("refusing batch run while a previous run is in flight");
            return Err(RunError::RunInFlight);
        }

        let started = Instant::now();
        let tasks: Vec<Task> = rows
            .iter()
            .map(|row| Task::pending(row.key.0, InvocationRequest::from_row(row, schema)))
            .collect();
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        self.store.replace_all(tasks);

        info!(
            total = ids.len(),
            group_size = self.group_size,
            groups = ids.len().div_ceil(self.group_size),
            "starting batch run"
        );

        for (group_index, group) in ids.chunks(self.group_size).enumerate() {
            debug!(group = group_index, size = group.len(), "starting group");
            // All invocations of the group go out without waiting between
            // them; the next group must not start before every one settles.
            join_all(group.iter().map(|&id| self.execute_task(id))).await;
            debug!(group = group_index, "group settled");
        }

        let completed = self.store.count_with_status(TaskStatus::Completed);
        let failed = self.store.count_with_status(TaskStatus::Failed);
        let summary = RunSummary {
            total: ids.len(),
            completed,
            failed,
            elapsed: started.elapsed(),
        };
        info!(
            total = summary.total,
            completed = summary.completed,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch run finished"
        );
        Ok(summary)
    }

    /// Re-issue a single failed task's invocation.
    ///
    /// Not gated by group membership; the task re-enters the same
    /// running → completed/failed transitions while every other task's
    /// status is left untouched.
    #[instrument(skip(self))]
    pub async fn retry(&self, id: TaskId) -> Result<(), RunError> {
        let task = self.store.get(id).ok_or(RunError::TaskNotFound(id))?;
        if task.status != TaskStatus::Failed {
            return Err(RunError::NotRetryable(id));
        }
        info!(task_id = id, "retrying failed task");
        self.execute_task(id).await;
        Ok(())
    }

    /// Issue one invocation and apply its settlement to the store by id.
    async fn execute_task(&self, id: TaskId) {
        let Some(task) = self.store.get(id) else {
            warn!(task_id = id, "task vanished before issue");
            return;
        };
        self.store.mark_running(id);
        match self.invoker.invoke(&task.request).await {
            Ok(response) => {
                debug!(task_id = id, message_id = %response.message_id, "task completed");
                self.store.complete(id, response);
            }
            Err(error) => {
                warn!(task_id = id, %error, "task failed");
                self.store.fail(id, error.to_string());
            }
        }
    }
}
