//! Blocking jobs
//!
//! Jobs whose work is synchronous (file crunching, shelling out and waiting,
//! CPU-heavy loops) implement [`BlockingJob`] and are registered through
//! [`JobRegistryBuilder::register_blocking`](super::JobRegistryBuilder::register_blocking).
//! Each run goes to tokio's blocking thread pool, so it never holds up the
//! runtime threads that serve triggers and report status.
//!
//! A blocking run cannot be cancelled. When shutdown abandons it, the thread
//! keeps going until the job returns.

use async_trait::async_trait;
use std::sync::Arc;

use super::ScheduledJob;
use crate::context::ExecutionContext;

/// A job whose execution is synchronous
///
/// The execution context of the run is installed on the blocking thread, so
/// [`ExecutionContext::current`] works inside `execute_job`.
pub trait BlockingJob: Send + Sync + 'static {
    /// Executes one run; same contract as [`ScheduledJob::execute_job`]
    fn execute_job(
        &self,
        job_id: &str,
        execution_id: &str,
        job_params: &str,
    ) -> anyhow::Result<i32>;

    /// Checks whether `job_params` may be used to schedule this job
    fn validate_job(&self, job_params: &str) -> bool;
}

/// Runs a [`BlockingJob`] on the blocking thread pool
pub struct Blocking<J> {
    job: Arc<J>,
}

impl<J: BlockingJob> Blocking<J> {
    pub fn new(job: J) -> Self {
        Self { job: Arc::new(job) }
    }
}

#[async_trait]
impl<J: BlockingJob> ScheduledJob for Blocking<J> {
    async fn execute_job(
        &self,
        job_id: &str,
        execution_id: &str,
        job_params: &str,
    ) -> anyhow::Result<i32> {
        let job = Arc::clone(&self.job);
        let job_id = job_id.to_string();
        let execution_id = execution_id.to_string();
        let job_params = job_params.to_string();
        let context = ExecutionContext::current();

        tokio::task::spawn_blocking(move || {
            let run = || job.execute_job(&job_id, &execution_id, &job_params);
            match context {
                Some(context) => context.sync_scope(run),
                None => run(),
            }
        })
        .await?
    }

    fn validate_job(&self, job_params: &str) -> bool {
        self.job.validate_job(job_params)
    }
}
