//! Test doubles shared by the agent's unit tests

use async_trait::async_trait;
use kala_client::{ClientError, Result, Scheduler};
use kala_core::domain::job::JobDefinition;
use kala_core::domain::stat::JobStat;
use kala_core::domain::status::ExecutionStatus;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::context::ExecutionContext;
use crate::job::ScheduledJob;

/// One status report seen by [`RecordingScheduler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub job_id: String,
    pub execution_id: String,
    pub status: ExecutionStatus,
}

#[derive(Default)]
struct Recorded {
    /// Accepted status reports
    status_updates: Vec<StatusUpdate>,
    /// Every status report, accepted or refused
    status_attempts: Vec<StatusUpdate>,
    parameter_updates: Vec<(String, String)>,
    calls: usize,
}

/// How a refused status report fails
#[derive(Debug, Clone, Copy, Default)]
enum Refusal {
    /// 503, nothing stored
    #[default]
    Unavailable,
    /// The given 4xx, nothing stored
    Rejected(u16),
    /// Stored, but answered with the given status instead of 204
    AppliedWith(u16),
}

/// In-memory [`Scheduler`] that records every call
#[derive(Default)]
pub struct RecordingScheduler {
    recorded: Mutex<Recorded>,
    /// Status reports left to refuse; `usize::MAX` refuses all of them
    failures_left: AtomicUsize,
    refusal: Refusal,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses the first `n` status reports with a 503
    pub fn failing_first(n: usize) -> Self {
        let scheduler = Self::default();
        scheduler.failures_left.store(n, Ordering::SeqCst);
        scheduler
    }

    /// Refuses every status report with a 503
    pub fn unreachable() -> Self {
        Self::failing_first(usize::MAX)
    }

    /// Refuses every status report with the given client error status
    pub fn rejecting(status: u16) -> Self {
        Self {
            refusal: Refusal::Rejected(status),
            ..Self::unreachable()
        }
    }

    /// Stores every status report but answers with `status` instead of 204
    pub fn applying_with(status: u16) -> Self {
        Self {
            refusal: Refusal::AppliedWith(status),
            ..Self::unreachable()
        }
    }

    pub fn status_updates(&self) -> Vec<StatusUpdate> {
        self.lock().status_updates.clone()
    }

    pub fn status_attempts(&self) -> Vec<StatusUpdate> {
        self.lock().status_attempts.clone()
    }

    /// Accepted statuses for one execution, in report order
    pub fn statuses_for(&self, execution_id: &str) -> Vec<ExecutionStatus> {
        self.lock()
            .status_updates
            .iter()
            .filter(|u| u.execution_id == execution_id)
            .map(|u| u.status)
            .collect()
    }

    pub fn parameter_updates(&self) -> Vec<(String, String)> {
        self.lock().parameter_updates.clone()
    }

    /// Total number of scheduler calls of any kind
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Waits until `count` status reports have been accepted
    pub async fn wait_for_updates(&self, count: usize) -> Vec<StatusUpdate> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let updates = self.status_updates();
            if updates.len() >= count || tokio::time::Instant::now() >= deadline {
                return updates;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    fn touch(&self) {
        self.lock().calls += 1;
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn add_job(&self, _job: &JobDefinition, _token: Option<&str>) -> Result<String> {
        self.touch();
        Ok("job-1".to_string())
    }

    async fn get_job(&self, _id: &str, _token: Option<&str>) -> Result<Option<JobDefinition>> {
        self.touch();
        Ok(None)
    }

    async fn get_job_parameters(&self, _id: &str, _token: Option<&str>) -> Result<Option<String>> {
        self.touch();
        Ok(None)
    }

    async fn set_job_parameters(&self, id: &str, params: &str, _token: Option<&str>) -> Result<()> {
        let mut recorded = self.lock();
        recorded.calls += 1;
        recorded
            .parameter_updates
            .push((id.to_string(), params.to_string()));
        Ok(())
    }

    async fn start_job(&self, _id: &str, _token: Option<&str>) -> Result<()> {
        self.touch();
        Ok(())
    }

    async fn enable_job(&self, _id: &str, _token: Option<&str>) -> Result<()> {
        self.touch();
        Ok(())
    }

    async fn disable_job(&self, _id: &str, _token: Option<&str>) -> Result<()> {
        self.touch();
        Ok(())
    }

    async fn delete_job(&self, _id: &str, _token: Option<&str>) -> Result<()> {
        self.touch();
        Ok(())
    }

    async fn delete_all_jobs(&self, _token: Option<&str>) -> Result<()> {
        self.touch();
        Ok(())
    }

    async fn list_jobs(&self, _token: Option<&str>) -> Result<Vec<JobDefinition>> {
        self.touch();
        Ok(Vec::new())
    }

    async fn get_job_execution_stats(
        &self,
        _execution_id: &str,
        _token: Option<&str>,
    ) -> Result<Option<JobStat>> {
        self.touch();
        Ok(None)
    }

    async fn get_all_job_execution_stats(
        &self,
        _job_id: &str,
        _token: Option<&str>,
    ) -> Result<Vec<JobStat>> {
        self.touch();
        Ok(Vec::new())
    }

    async fn update_job_execution_status(
        &self,
        job_id: &str,
        execution_id: &str,
        status: ExecutionStatus,
        _token: Option<&str>,
    ) -> Result<()> {
        let update = StatusUpdate {
            job_id: job_id.to_string(),
            execution_id: execution_id.to_string(),
            status,
        };
        let refuse = self.take_failure();

        let mut recorded = self.lock();
        recorded.calls += 1;
        recorded.status_attempts.push(update.clone());
        if !refuse {
            recorded.status_updates.push(update);
            return Ok(());
        }

        match self.refusal {
            Refusal::Unavailable => Err(ClientError::api_error(503, "coordinator unavailable")),
            Refusal::Rejected(status) => Err(ClientError::api_error(status, "rejected")),
            Refusal::AppliedWith(status) => {
                recorded.status_updates.push(update);
                Err(ClientError::UnexpectedStatus {
                    expected: 204,
                    status,
                })
            }
        }
    }
}

/// What a [`FixedJob`] does when executed
#[derive(Debug, Clone)]
enum Behaviour {
    Return(i32),
    Error(String),
    Panic,
    Sleep(Duration),
}

/// Job with a scripted outcome
pub struct FixedJob {
    behaviour: Behaviour,
    /// Only this parameter string validates, when set
    accepted_params: Option<String>,
    executions: AtomicUsize,
    last_context: Mutex<Option<ExecutionContext>>,
}

impl FixedJob {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            accepted_params: None,
            executions: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    pub fn succeeding() -> Self {
        Self::returning(0)
    }

    pub fn returning(code: i32) -> Self {
        Self::with_behaviour(Behaviour::Return(code))
    }

    pub fn erroring(message: &str) -> Self {
        Self::with_behaviour(Behaviour::Error(message.to_string()))
    }

    pub fn panicking() -> Self {
        Self::with_behaviour(Behaviour::Panic)
    }

    /// Sleeps for `duration`, then succeeds
    pub fn sleeping(duration: Duration) -> Self {
        Self::with_behaviour(Behaviour::Sleep(duration))
    }

    /// Validates only `params`
    pub fn accepting(mut self, params: &str) -> Self {
        self.accepted_params = Some(params.to_string());
        self
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Context that was installed during the latest execution
    pub fn last_context(&self) -> Option<ExecutionContext> {
        self.last_context.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScheduledJob for FixedJob {
    async fn execute_job(
        &self,
        _job_id: &str,
        _execution_id: &str,
        _job_params: &str,
    ) -> anyhow::Result<i32> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = ExecutionContext::current();

        match &self.behaviour {
            Behaviour::Return(code) => Ok(*code),
            Behaviour::Error(message) => Err(anyhow::anyhow!(message.clone())),
            Behaviour::Panic => panic!("scripted job panic"),
            Behaviour::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(0)
            }
        }
    }

    fn validate_job(&self, job_params: &str) -> bool {
        match &self.accepted_params {
            Some(accepted) => accepted == job_params,
            None => true,
        }
    }
}
