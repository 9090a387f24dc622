//! Dispatcher
//!
//! Entry point for triggers coming from the coordinator. Looks the job up,
//! captures the caller's context and hands an [`ExecutionTask`] to the pool.

use kala_client::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::pool::{ShutdownReport, SubmitError, WorkerPool};
use super::task::{ExecutionTask, RetryPolicy};
use crate::context::ExecutionContext;
use crate::job::JobRegistry;

/// A request to run one execution of a named job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTrigger {
    pub job_name: String,
    pub job_id: String,
    pub execution_id: String,
    pub job_params: String,
}

impl JobTrigger {
    pub fn new(
        job_name: impl Into<String>,
        job_id: impl Into<String>,
        execution_id: impl Into<String>,
        job_params: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            job_id: job_id.into(),
            execution_id: execution_id.into(),
            job_params: job_params.into(),
        }
    }
}

/// Result of [`Dispatcher::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The execution was queued
    Accepted,
    /// No job is registered under that name
    NotFound,
    /// The pool refused the execution
    Rejected(SubmitError),
}

/// Routes triggers to registered jobs
pub struct Dispatcher {
    registry: JobRegistry,
    scheduler: Arc<dyn Scheduler>,
    pool: WorkerPool,
    retry: RetryPolicy,
}

impl Dispatcher {
    pub fn new(registry: JobRegistry, scheduler: Arc<dyn Scheduler>, pool: WorkerPool) -> Self {
        Self {
            registry,
            scheduler,
            pool,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the retry policy for terminal status reports
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Queues one execution without waiting for it
    ///
    /// `context` is the caller's request-scoped context; it is extended with
    /// the job identity and travels with the execution. Nothing is reported
    /// to the coordinator unless the execution is accepted.
    pub fn dispatch(&self, trigger: JobTrigger, context: ExecutionContext) -> DispatchOutcome {
        let Some(job) = self.registry.get(&trigger.job_name) else {
            warn!("No job registered under '{}'", trigger.job_name);
            return DispatchOutcome::NotFound;
        };

        let context = context
            .with("job_name", trigger.job_name.as_str())
            .with("job_id", trigger.job_id.as_str())
            .with("execution_id", trigger.execution_id.as_str());

        let task = ExecutionTask {
            job_name: trigger.job_name,
            job_id: trigger.job_id,
            execution_id: trigger.execution_id,
            job_params: trigger.job_params,
            job,
            scheduler: Arc::clone(&self.scheduler),
            context,
            retry: self.retry,
        };
        let job_name = task.job_name.clone();
        let execution_id = task.execution_id.clone();

        match self.pool.submit(async move {
            let execution_id = task.execution_id.clone();
            let report = task.run().await;
            if report.terminal_reported {
                debug!("Execution {} settled as {}", execution_id, report.status);
            } else {
                warn!(
                    "Coordinator never acknowledged {} for execution {}",
                    report.status, execution_id
                );
            }
        }) {
            Ok(()) => {
                debug!("Queued execution {} of {}", execution_id, job_name);
                DispatchOutcome::Accepted
            }
            Err(e) => {
                warn!(
                    "Rejected execution {} of {}: {}",
                    execution_id, job_name, e
                );
                DispatchOutcome::Rejected(e)
            }
        }
    }

    /// Runs a job's parameter validation
    ///
    /// Returns `None` when no job is registered under `job_name`.
    pub fn validate(&self, job_name: &str, job_params: &str) -> Option<bool> {
        let job = self.registry.get(job_name)?;
        let valid = job.validate_job(job_params);
        debug!("Validated parameters for {}: {}", job_name, valid);
        Some(valid)
    }

    /// Stops accepting triggers and drains in-flight executions
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        info!("Dispatcher shutting down");
        self.pool.shutdown(grace).await
    }
}
