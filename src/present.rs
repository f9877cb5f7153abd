//! Per-task result view models
//!
//! Pure derivation of what a frontend should render for one task: a
//! loading placeholder while the invocation is in flight, an error panel
//! with a retry control on failure, or a two-tab result/detail view once
//! settled. The widgets themselves (code viewer, JSON viewer, clipboard)
//! are external collaborators; this module only decides what they get.

use serde_json::Value;

use crate::batch::{Task, TaskStatus, WorkflowTrace};

/// Tabs of a settled task's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTab {
    /// Primary textual/structured output with copy-to-clipboard
    Result,
    /// Full structured trace, read-only
    Detail,
}

/// What to render for one task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskView {
    /// Invocation pending or in flight; show a loading placeholder
    Loading,

    /// Task failed; error style plus a retry control instead of the tabs
    Failed {
        /// Verbatim remote error message
        error: String,
    },

    /// Task settled successfully; tabbed result/detail view
    Settled {
        /// Tab to open with: [`ResultTab::Result`] when a primary result
        /// exists, else [`ResultTab::Detail`]
        default_tab: ResultTab,
        /// Primary textual output, when present
        result_text: Option<String>,
        /// Pretty-printed trace JSON for the detail tab
        detail_json: String,
        /// Clipboard payload; `None` disables the copy control
        copy: Option<String>,
        /// Character count of the primary text, shown when there is no
        /// structured trace to tab through
        char_count: usize,
    },
}

impl TaskView {
    /// Derive the view for a task's current state.
    pub fn of(task: &Task) -> Self {
        match task.status {
            TaskStatus::Pending | TaskStatus::Running => Self::Loading,
            TaskStatus::Failed => Self::Failed {
                error: task
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
            TaskStatus::Completed => {
                let trace = task.trace.as_ref();
                let result_text = trace.and_then(|t| t.result_text.clone());
                let default_tab = if result_text.is_some() {
                    ResultTab::Result
                } else {
                    ResultTab::Detail
                };
                Self::Settled {
                    default_tab,
                    result_text: result_text.clone(),
                    detail_json: trace.map(pretty_trace).unwrap_or_else(|| "{}".to_string()),
                    copy: copy_payload(task),
                    char_count: result_text.map(|t| t.chars().count()).unwrap_or(0),
                }
            }
        }
    }
}

/// Clipboard payload for a settled task.
///
/// The primary result text when it exists, otherwise the JSON-serialized
/// trace. Disabled (`None`) when the task has no message to copy, i.e. no
/// remote message id or no trace at all.
pub fn copy_payload(task: &Task) -> Option<String> {
    if task.message_id.is_none() {
        return None;
    }
    let trace = task.trace.as_ref()?;
    match &trace.result_text {
        Some(text) => Some(text.clone()),
        None => serde_json::to_string(&trace.raw).ok(),
    }
}

fn pretty_trace(trace: &WorkflowTrace) -> String {
    serde_json::to_string_pretty(&trace.raw).unwrap_or_else(|_| Value::Null.to_string())
}
