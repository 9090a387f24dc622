//! Execution status
//!
//! Status of a single job execution as reported to the coordinator.

use serde::{Deserialize, Serialize};

/// Execution status
///
/// Serialises to the coordinator's exact string values
/// (`"Started"`, `"Running"`, `"Failed"`, `"Success"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Execution was triggered but has not been picked up by a worker
    Started,

    /// A worker is executing the job
    Running,

    /// The job returned a nonzero outcome or failed unexpectedly
    Failed,

    /// The job returned a zero outcome
    Success,
}

impl ExecutionStatus {
    /// Maps a job's completion code to its terminal status
    pub fn from_outcome(code: i32) -> Self {
        if code == 0 {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        }
    }

    /// Whether no further transition follows this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Failed | ExecutionStatus::Success)
    }

    /// The wire value of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Started => "Started",
            ExecutionStatus::Running => "Running",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Success => "Success",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Started" => Ok(ExecutionStatus::Started),
            "Running" => Ok(ExecutionStatus::Running),
            "Failed" => Ok(ExecutionStatus::Failed),
            "Success" => Ok(ExecutionStatus::Success),
            other => Err(format!("unknown execution status: {}", other)),
        }
    }
}
