//! Job contract
//!
//! Every locally registered job implements [`ScheduledJob`]. The agent looks
//! jobs up by name in the [`JobRegistry`] and runs them on the worker pool.
//! Synchronous jobs implement [`BlockingJob`] instead.

mod blocking;
mod registry;

pub use blocking::{Blocking, BlockingJob};
pub use registry::{JobRegistry, JobRegistryBuilder, RegistryError};

use async_trait::async_trait;
use kala_client::Scheduler;
use std::sync::Arc;

/// A job the coordinator can trigger on this agent
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use kala_agent::job::ScheduledJob;
///
/// struct Greeter;
///
/// #[async_trait]
/// impl ScheduledJob for Greeter {
///     async fn execute_job(&self, _job_id: &str, _execution_id: &str, params: &str) -> anyhow::Result<i32> {
///         tracing::info!("Hello, {}", params);
///         Ok(0)
///     }
///
///     fn validate_job(&self, params: &str) -> bool {
///         !params.is_empty()
///     }
/// }
/// ```
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Executes one run of the job
    ///
    /// # Arguments
    /// * `job_id` - The coordinator's id for the job definition
    /// * `execution_id` - The id of this run
    /// * `job_params` - The job's parameter string, passed through uninterpreted
    ///
    /// # Returns
    /// The completion code: 0 for success, anything else for failure.
    /// Expected failures should be reported as a nonzero code; an `Err` (or a
    /// panic) is treated as an unexpected failure and also ends as `Failed`.
    ///
    /// Runs on a runtime worker thread. Jobs that block should implement
    /// [`BlockingJob`] and be registered with
    /// [`JobRegistryBuilder::register_blocking`].
    async fn execute_job(
        &self,
        job_id: &str,
        execution_id: &str,
        job_params: &str,
    ) -> anyhow::Result<i32>;

    /// Checks whether `job_params` may be used to schedule this job
    ///
    /// Must not have side effects.
    fn validate_job(&self, job_params: &str) -> bool;
}

/// Coordinator access for job implementations
///
/// Jobs that need to talk to the coordinator themselves (for example to
/// rewrite their own parameters for the next run) hold one of these.
#[derive(Clone)]
pub struct SchedulerHandle {
    scheduler: Arc<dyn Scheduler>,
}

impl SchedulerHandle {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// The underlying scheduler
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// Replaces the parameters the coordinator passes on the job's next run
    pub async fn update_job_params(&self, job_id: &str, job_params: &str) -> kala_client::Result<()> {
        self.scheduler
            .set_job_parameters(job_id, job_params, None)
            .await
    }
}
