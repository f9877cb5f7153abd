//! Task and invocation types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use thiserror::Error;

use crate::schema::{VarType, VariableSchema};
use crate::table::TableRow;

/// Fixed cap on simultaneously in-flight row invocations.
///
/// Chosen to stay under the remote endpoint's requests-per-minute limit.
/// One group of at most this many tasks runs to full settlement before the
/// next group starts.
pub const GROUP_SIZE: usize = 5;

/// Task identifier; equals the row key of the row it was built from and is
/// the sole correlation key for incremental result updates.
pub type TaskId = u64;

/// Per-row task state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, invocation not yet issued
    Pending,
    /// Invocation issued, awaiting settlement
    Running,
    /// Settled successfully
    Completed,
    /// Settled with a remote error
    Failed,
}

/// One named input of an invocation, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    /// Variable name
    pub name: String,
    /// String value from the row
    pub value: String,
}

/// A file-typed value, carried as the opaque upload handle the row holds.
///
/// Handles reference uploads already performed; the engine never re-uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Variable name of the file column
    pub name: String,
    /// Opaque upload handle
    pub handle: String,
}

/// Request shape of one remote invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Non-file inputs in schema order
    pub inputs: SmallVec<[TaskInput; 8]>,
    /// File references in schema order
    pub files: Vec<FileRef>,
}

impl InvocationRequest {
    /// Map a row's values onto the invocation argument shape.
    ///
    /// Values are emitted in schema column order; file-typed columns are
    /// split out as [`FileRef`]s and passed through unchanged.
    pub fn from_row(row: &TableRow, schema: &VariableSchema) -> Self {
        let mut inputs = SmallVec::new();
        let mut files = Vec::new();
        for column in schema.columns() {
            let value = row.value(&column.name).to_string();
            if column.var_type == VarType::File {
                files.push(FileRef {
                    name: column.name.clone(),
                    handle: value,
                });
            } else {
                inputs.push(TaskInput {
                    name: column.name.clone(),
                    value,
                });
            }
        }
        Self { inputs, files }
    }
}

/// Structured trace of one settled invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTrace {
    /// Primary textual output, when the workflow produced one
    pub result_text: Option<String>,
    /// Full structured execution trace
    pub raw: Value,
}

/// Successful invocation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// Remote message identifier for this invocation
    pub message_id: String,
    /// Workflow execution trace
    pub trace: WorkflowTrace,
}

/// Remote invocation failure; the message is surfaced to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// Error reported by the remote endpoint
    #[error("{0}")]
    Remote(String),
}

/// The per-row unit of scheduling and status tracking for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Correlation key, equal to the source row's key
    pub id: TaskId,
    /// Current state-machine position
    pub status: TaskStatus,
    /// The invocation parameters derived from the row
    pub request: InvocationRequest,
    /// Remote message id, set on completion
    pub message_id: Option<String>,
    /// Workflow trace, set on completion
    pub trace: Option<WorkflowTrace>,
    /// Error message, set on failure
    pub error: Option<String>,
}

impl Task {
    /// Create a pending task for a row.
    pub fn pending(id: TaskId, request: InvocationRequest) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            request,
            message_id: None,
            trace: None,
            error: None,
        }
    }

    /// True while the invocation is in flight. Derived from status rather
    /// than stored as a separate flag.
    pub fn is_loading(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// True once the task has settled either way.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Seam to the remote endpoint.
///
/// The HTTP/streaming client is an external collaborator; the embedding
/// application implements this trait over it.
#[async_trait]
pub trait TaskInvoker: Send + Sync {
    /// Perform one remote invocation.
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResponse, InvokeError>;
}
