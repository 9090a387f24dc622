//! Job dispatch
//!
//! Turns coordinator triggers into executions on a bounded worker pool.

mod dispatcher;
mod pool;
mod task;

pub use dispatcher::{DispatchOutcome, Dispatcher, JobTrigger};
pub use pool::{ShutdownReport, SubmitError, WorkerPool};
pub use task::{ExecutionTask, RetryPolicy, TaskReport};
