//! Execution statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics for one job execution, as recorded by the coordinator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStat {
    pub id: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ran_at: Option<DateTime<Utc>>,
    pub number_of_retries: u32,
    pub success: bool,
    /// Wall-clock duration in nanoseconds
    pub execution_duration: i64,
}

impl JobStat {
    /// Execution duration, clamped at zero
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.execution_duration.max(0) as u64)
    }
}
