//! Batch execution tests
//!
//! Grouped fan-out over a controllable mock invoker: group sizing, the
//! settlement barrier between groups, failure isolation, per-task retry,
//! and run refusal.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use batchrun::batch::{
    BatchScheduler, InvocationRequest, InvocationResponse, InvokeError, RunError, Task,
    TaskInvoker, TaskResultStore, TaskStatus, WorkflowTrace, GROUP_SIZE,
};
use batchrun::schema::{VarType, Variable, VariableSchema};
use batchrun::table::{RowKeys, TableRow};

/// Mock endpoint that records, for every invocation, which tasks had
/// already settled when it was issued, plus a concurrency high-water mark.
struct MockInvoker {
    starts: Mutex<Vec<(u64, Vec<u64>)>>,
    settled: Mutex<Vec<u64>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_ids: HashSet<u64>,
    fail_once: Mutex<HashSet<u64>>,
}

impl MockInvoker {
    fn new() -> Self {
        Self {
            starts: Mutex::new(Vec::new()),
            settled: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fail_ids: HashSet::new(),
            fail_once: Mutex::new(HashSet::new()),
        }
    }

    fn failing(ids: impl IntoIterator<Item = u64>) -> Self {
        let mut mock = Self::new();
        mock.fail_ids = ids.into_iter().collect();
        mock
    }

    fn failing_once(ids: impl IntoIterator<Item = u64>) -> Self {
        let mock = Self::new();
        *mock.fail_once.lock().unwrap() = ids.into_iter().collect();
        mock
    }
}

#[async_trait]
impl TaskInvoker for MockInvoker {
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResponse, InvokeError> {
        let id: u64 = request.inputs[0].value.parse().expect("row value is the id");

        self.starts
            .lock()
            .unwrap()
            .push((id, self.settled.lock().unwrap().clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Varying settle times shuffle completion order within a group.
        tokio::time::sleep(Duration::from_millis(3 + (id % 3) * 4)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.settled.lock().unwrap().push(id);

        let fail = self.fail_ids.contains(&id) || self.fail_once.lock().unwrap().remove(&id);
        if fail {
            Err(InvokeError::Remote(format!("remote error for task {id}")))
        } else {
            Ok(InvocationResponse {
                message_id: format!("msg-{id}"),
                trace: WorkflowTrace {
                    result_text: Some(format!("answer {id}")),
                    raw: serde_json::json!({ "task": id }),
                },
            })
        }
    }
}

fn schema() -> VariableSchema {
    VariableSchema::new(vec![Variable::new("q", "Q", true, VarType::Text)]).unwrap()
}

fn rows(count: usize) -> Vec<TableRow> {
    let mut keys = RowKeys::new();
    (0..count)
        .map(|i| {
            let mut row = TableRow::empty(keys.mint());
            row.set("q", i.to_string());
            row
        })
        .collect()
}

fn scheduler(invoker: Arc<MockInvoker>) -> BatchScheduler {
    BatchScheduler::new(invoker, Arc::new(TaskResultStore::new()))
}

#[tokio::test]
async fn test_twelve_rows_run_in_three_groups() {
    let invoker = Arc::new(MockInvoker::new());
    let sched = scheduler(invoker.clone());

    let summary = sched.run(&rows(12), &schema()).await.expect("run succeeds");
    assert_eq!(summary.total, 12);
    assert_eq!(summary.completed, 12);
    assert_eq!(summary.failed, 0);

    // Never more than GROUP_SIZE in flight.
    assert!(invoker.max_in_flight.load(Ordering::SeqCst) <= GROUP_SIZE);

    // Every task of an earlier group settles before any later-group task
    // is issued: the group boundary is a hard barrier.
    let starts = invoker.starts.lock().unwrap();
    assert_eq!(starts.len(), 12);
    for (id, settled_at_start) in starts.iter() {
        let group = (*id as usize) / GROUP_SIZE;
        let earlier: HashSet<u64> = (0..(group * GROUP_SIZE) as u64).collect();
        let seen: HashSet<u64> = settled_at_start.iter().copied().collect();
        assert!(
            earlier.is_subset(&seen),
            "task {id} started before group {} fully settled",
            group.saturating_sub(1),
        );
    }

    // Group sizes are 5, 5, 2 in original order.
    let issue_order: Vec<u64> = starts.iter().map(|(id, _)| *id).collect();
    let mut sorted_within_groups = issue_order.clone();
    for chunk in sorted_within_groups.chunks_mut(GROUP_SIZE) {
        chunk.sort_unstable();
    }
    assert_eq!(sorted_within_groups, (0..12).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_group_size_override_caps_concurrency() {
    let invoker = Arc::new(MockInvoker::new());
    let sched = BatchScheduler::new(invoker.clone(), Arc::new(TaskResultStore::new()))
        .with_group_size(2);

    let summary = sched.run(&rows(5), &schema()).await.expect("run settles");
    assert_eq!(summary.completed, 5);
    assert!(invoker.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_failure_is_isolated_to_its_row() {
    let invoker = Arc::new(MockInvoker::failing([2]));
    let sched = scheduler(invoker.clone());

    let summary = sched.run(&rows(7), &schema()).await.expect("run settles");
    assert_eq!(summary.completed, 6);
    assert_eq!(summary.failed, 1);

    let tasks = sched.store().snapshot();
    for task in &tasks {
        if task.id == 2 {
            assert_eq!(task.status, TaskStatus::Failed);
            assert_eq!(task.error.as_deref(), Some("remote error for task 2"));
        } else {
            assert_eq!(task.status, TaskStatus::Completed, "task {}", task.id);
        }
    }

    // The second group still ran despite the group-1 failure.
    assert_eq!(invoker.starts.lock().unwrap().len(), 7);
}

#[tokio::test]
async fn test_retry_touches_only_the_failed_task() {
    let invoker = Arc::new(MockInvoker::failing_once([3]));
    let sched = scheduler(invoker.clone());

    sched.run(&rows(5), &schema()).await.expect("run settles");
    assert_eq!(sched.store().get(3).unwrap().status, TaskStatus::Failed);

    let before: Vec<Task> = sched
        .store()
        .snapshot()
        .into_iter()
        .filter(|t| t.id != 3)
        .collect();

    sched.retry(3).await.expect("retry allowed for failed task");

    let retried = sched.store().get(3).unwrap();
    assert_eq!(retried.status, TaskStatus::Completed);
    assert_eq!(retried.message_id.as_deref(), Some("msg-3"));
    assert!(retried.error.is_none());

    let after: Vec<Task> = sched
        .store()
        .snapshot()
        .into_iter()
        .filter(|t| t.id != 3)
        .collect();
    assert_eq!(before, after, "other tasks must be untouched by retry");
}

#[tokio::test]
async fn test_retry_rejected_for_unfailed_tasks() {
    let invoker = Arc::new(MockInvoker::new());
    let sched = scheduler(invoker);

    sched.run(&rows(2), &schema()).await.expect("run settles");
    assert_eq!(sched.retry(0).await, Err(RunError::NotRetryable(0)));
    assert_eq!(sched.retry(99).await, Err(RunError::TaskNotFound(99)));
}

#[tokio::test]
async fn test_run_refused_without_rows() {
    let invoker = Arc::new(MockInvoker::new());
    let sched = scheduler(invoker.clone());

    assert_eq!(sched.run(&[], &schema()).await, Err(RunError::NoRows));
    assert!(sched.store().is_empty(), "refusal must not touch the store");
    assert!(invoker.starts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_refused_while_previous_run_unsettled() {
    let invoker = Arc::new(MockInvoker::new());
    let store = Arc::new(TaskResultStore::new());
    let sched = BatchScheduler::new(invoker, store.clone());

    // A task of a prior run is still in flight.
    let mut stale = rows(1);
    let request = InvocationRequest::from_row(&stale.remove(0), &schema());
    let mut task = Task::pending(0, request);
    task.status = TaskStatus::Running;
    store.replace_all(vec![task]);

    assert_eq!(sched.run(&rows(3), &schema()).await, Err(RunError::RunInFlight));
    assert_eq!(store.len(), 1, "refusal must not replace the store");
}

#[tokio::test]
async fn test_new_run_replaces_previous_tasks() {
    let invoker = Arc::new(MockInvoker::new());
    let sched = scheduler(invoker);

    sched.run(&rows(4), &schema()).await.expect("first run");
    assert_eq!(sched.store().len(), 4);

    let mut keys = RowKeys::new();
    let rows2: Vec<TableRow> = (0..2)
        .map(|i| {
            let mut row = TableRow::empty(keys.mint());
            row.set("q", i.to_string());
            row
        })
        .collect();
    sched.run(&rows2, &schema()).await.expect("second run");
    assert_eq!(sched.store().len(), 2);
    assert!(sched.store().is_all_finished());
}
