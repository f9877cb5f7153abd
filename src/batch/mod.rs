//! Batch scheduling subsystem
//!
//! One [`Task`] per validated table row, fanned out in groups of at most
//! [`GROUP_SIZE`] concurrent remote invocations, with per-row status and
//! results held in a [`TaskResultStore`].

pub mod scheduler;
pub mod store;
pub mod types;

pub use scheduler::{BatchScheduler, RunError, RunSummary};
pub use store::TaskResultStore;
pub use types::{
    FileRef, InvocationRequest, InvocationResponse, InvokeError, Task, TaskId, TaskInput,
    TaskInvoker, TaskStatus, WorkflowTrace, GROUP_SIZE,
};
