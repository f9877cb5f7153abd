//! # Batchrun
//!
//! A batch-execution engine for running one remote LLM invocation per row of
//! a tabular input set, under a hard concurrency cap.
//!
//! ## Overview
//!
//! Given a variable schema supplied by an external flow editor and a raw
//! text grid (uploaded or hand-edited), the engine validates the grid,
//! builds one [`batch::Task`] per data row, fans the invocations out in
//! fixed-size groups, and tracks per-row outcomes that a frontend renders
//! through [`present::TaskView`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use batchrun::schema::{Variable, VariableSchema, VarType};
//! use batchrun::batch::{BatchScheduler, TaskResultStore, TaskInvoker,
//!     InvocationRequest, InvocationResponse, InvokeError, WorkflowTrace};
//! use batchrun::{table, validate};
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl TaskInvoker for Echo {
//!     async fn invoke(&self, request: &InvocationRequest)
//!         -> Result<InvocationResponse, InvokeError>
//!     {
//!         let text = request.inputs.first().map(|i| i.value.clone());
//!         Ok(InvocationResponse {
//!             message_id: "msg-0".into(),
//!             trace: WorkflowTrace { result_text: text, raw: serde_json::json!({}) },
//!         })
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = VariableSchema::new(vec![
//!     Variable::new("question", "Question", true, VarType::Text),
//! ])?;
//!
//! let grid = vec![
//!     vec!["Question".to_string()],
//!     vec!["What is a monad?".to_string()],
//! ];
//! validate::check_batch_inputs(&grid, &schema)?;
//!
//! let mut keys = table::RowKeys::new();
//! let rows = table::grid_to_rows(&grid, &schema, &mut keys);
//!
//! let store = Arc::new(TaskResultStore::new());
//! let scheduler = BatchScheduler::new(Arc::new(Echo), store.clone());
//! let summary = scheduler.run(&rows, &schema).await?;
//! assert_eq!(summary.completed, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: variable schema types the table must conform to
//! - [`table`]: raw-grid / row-object transforms and row identity
//! - [`validate`]: pre-run structural and content validation
//! - [`grid`]: headless editable-grid model
//! - [`batch`]: grouped scheduler, task store, invocation seam
//! - [`present`]: per-task result view models
//! - [`exchange`]: template download and upload ingestion shapes
//! - [`observe`]: tracing subscriber setup

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for batchrun operations
pub type Result<T> = std::result::Result<T, BatchRunError>;

/// Main error type for batchrun operations
#[derive(Error, Debug)]
pub enum BatchRunError {
    /// Variable schema construction error
    #[error("Schema error: {0}")]
    Schema(#[from] schema::SchemaError),

    /// Table validation error (structural or line-specific)
    #[error("Validation error: {0}")]
    Validation(#[from] validate::ValidateError),

    /// Cell edit rejected by the column's editor
    #[error("Edit error: {0}")]
    Edit(#[from] grid::EditError),

    /// Scheduler refused or failed to run
    #[error("Run error: {0}")]
    Run(#[from] batch::RunError),

    /// Remote invocation failure surfaced outside a task
    #[error("Invocation error: {0}")]
    Invoke(#[from] batch::InvokeError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Variable schema types
pub mod schema;

/// Table shapes and the grid/row adapter
pub mod table;

/// Pre-run input validation
pub mod validate;

/// Headless editable-grid model
pub mod grid;

/// Batch scheduling, task store, and the invocation seam
pub mod batch;

/// Per-task result view models
pub mod present;

/// Template and upload interchange helpers
pub mod exchange;

/// Tracing subscriber setup
pub mod observe;
