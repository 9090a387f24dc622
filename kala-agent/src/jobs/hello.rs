//! Hello job
//!
//! Greets the configured requester. Useful for checking that the coordinator
//! can reach the agent end to end.

use async_trait::async_trait;
use tracing::info;

use crate::job::ScheduledJob;

/// Name the Hello job is registered under
pub const HELLO_JOB: &str = "Hello";

pub struct HelloJob {
    requester: String,
}

impl HelloJob {
    /// Creates a job that only accepts `requester` as its parameters
    pub fn new(requester: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
        }
    }
}

impl Default for HelloJob {
    fn default() -> Self {
        Self::new("TestUser1")
    }
}

#[async_trait]
impl ScheduledJob for HelloJob {
    async fn execute_job(
        &self,
        _job_id: &str,
        _execution_id: &str,
        job_params: &str,
    ) -> anyhow::Result<i32> {
        info!("Hello, {}", job_params);
        Ok(0)
    }

    fn validate_job(&self, job_params: &str) -> bool {
        job_params == self.requester
    }
}
