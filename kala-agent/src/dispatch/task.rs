//! Execution task
//!
//! One triggered run of a job. The task reports `Running`, invokes the job,
//! then reports exactly one terminal status (`Success` or `Failed`). The
//! job's own failures, including panics, never escape the task.

use kala_client::Scheduler;
use kala_core::domain::status::ExecutionStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::context::ExecutionContext;
use crate::job::ScheduledJob;

/// Retry settings for the terminal status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retry)
    pub attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            ..Self::default()
        }
    }

    /// Overrides the backoff delays
    pub fn with_delays(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self
    }

    /// A single attempt
    pub fn none() -> Self {
        Self::new(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// What happened to one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    /// Terminal status derived from the job's outcome
    pub status: ExecutionStatus,
    /// The coordinator accepted the `Running` report
    pub running_reported: bool,
    /// The coordinator accepted the terminal report
    pub terminal_reported: bool,
}

/// A single triggered execution, ready to run on a worker
pub struct ExecutionTask {
    pub job_name: String,
    pub job_id: String,
    pub execution_id: String,
    pub job_params: String,
    pub job: Arc<dyn ScheduledJob>,
    pub scheduler: Arc<dyn Scheduler>,
    pub context: ExecutionContext,
    pub retry: RetryPolicy,
}

impl ExecutionTask {
    /// Runs the execution with its context installed and inside its span
    pub async fn run(self) -> TaskReport {
        let span = info_span!(
            "execution",
            job = %self.job_name,
            job_id = %self.job_id,
            execution_id = %self.execution_id,
            correlation_id = %self.context.correlation_id().unwrap_or("-"),
        );
        let context = self.context.clone();

        context.scope(self.execute()).instrument(span).await
    }

    async fn execute(self) -> TaskReport {
        let running_reported = self.report(ExecutionStatus::Running).await.is_ok();

        let status = self.invoke().await;
        info!("Job {} finished: {}", self.job_name, status);

        let terminal_reported = self.report_terminal(status).await;

        TaskReport {
            status,
            running_reported,
            terminal_reported,
        }
    }

    /// Runs the job on its own task so a panic is caught as a failure
    async fn invoke(&self) -> ExecutionStatus {
        let job = Arc::clone(&self.job);
        let job_id = self.job_id.clone();
        let execution_id = self.execution_id.clone();
        let job_params = self.job_params.clone();

        let mut set = JoinSet::new();
        set.spawn(
            self.context
                .clone()
                .scope(async move { job.execute_job(&job_id, &execution_id, &job_params).await })
                .in_current_span(),
        );

        match set.join_next().await {
            Some(Ok(Ok(code))) => {
                if code != 0 {
                    warn!("Job {} returned nonzero outcome {}", self.job_name, code);
                }
                ExecutionStatus::from_outcome(code)
            }
            Some(Ok(Err(e))) => {
                error!("Job {} failed: {:#}", self.job_name, e);
                ExecutionStatus::Failed
            }
            Some(Err(e)) if e.is_panic() => {
                error!("Job {} panicked", self.job_name);
                ExecutionStatus::Failed
            }
            Some(Err(e)) => {
                error!("Job {} did not complete: {}", self.job_name, e);
                ExecutionStatus::Failed
            }
            None => ExecutionStatus::Failed,
        }
    }

    /// Sends one status report, logging a failure
    async fn report(&self, status: ExecutionStatus) -> kala_client::Result<()> {
        self.scheduler
            .update_job_execution_status(&self.job_id, &self.execution_id, status, None)
            .await
            .inspect(|_| debug!("Reported {} for execution {}", status, self.execution_id))
            .inspect_err(|e| {
                warn!(
                    "Failed to report {} for execution {}: {}",
                    status, self.execution_id, e
                )
            })
    }

    /// Sends the terminal report with exponential backoff
    ///
    /// Only transport failures and 5xx answers are retried.
    async fn report_terminal(&self, status: ExecutionStatus) -> bool {
        if !status.is_terminal() {
            error!("Refusing to report non-terminal {} as the outcome", status);
            return false;
        }

        let mut attempt = 0;
        let mut delay = self.retry.initial_delay;

        loop {
            attempt += 1;

            let e = match self.report(status).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(
                            "Reported {} for execution {} after {} attempt(s)",
                            status, self.execution_id, attempt
                        );
                    }
                    return true;
                }
                Err(e) => e,
            };

            if !e.is_retryable() {
                error!(
                    "Not retrying {} for execution {}: {}",
                    status, self.execution_id, e
                );
                return false;
            }

            if attempt >= self.retry.attempts {
                error!(
                    "Giving up reporting {} for execution {} after {} attempt(s)",
                    status, self.execution_id, attempt
                );
                return false;
            }

            debug!("Retrying status report in {:?}", delay);
            tokio::time::sleep(delay).await;

            // Exponential backoff with cap
            delay = (delay * 2).min(self.retry.max_delay);
        }
    }
}
