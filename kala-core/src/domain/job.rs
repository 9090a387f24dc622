//! Job definition domain types
//!
//! A job definition is owned by the coordinator. The agent reads and writes it
//! only through the scheduler client and never interprets the schedule,
//! retry or dependency fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persistent job definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDefinition {
    pub name: String,

    /// Assigned by the coordinator on creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Command to run for local jobs (e.g. "bash /path/to/script.sh")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Email of the job's owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub disabled: bool,

    /// Jobs run after this one completes
    pub dependent_jobs: Vec<String>,

    /// Jobs this one depends on
    pub parent_jobs: Vec<String>,

    /// Job run once all retries of a run have failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure_job: Option<String>,

    /// ISO 8601 repeating interval (e.g. "R/2014-03-08T20:00:00.000Z/PT2H")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,

    /// Retries per failed run
    pub retries: u32,

    /// Duration within which a retry is still considered safe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,

    /// Left and right templating delimiters separated by a space (e.g. "{{ }}")
    #[serde(rename = "TemplateDelimiters", skip_serializing_if = "Option::is_none")]
    pub template_delimiters: Option<String>,

    pub resume_at_next_scheduled_time: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(rename = "type")]
    pub job_type: JobType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_properties: Option<RemoteProperties>,

    pub is_done: bool,
}

impl JobDefinition {
    /// Creates a local job definition with the given name and command
    pub fn local(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: Some(command.into()),
            job_type: JobType::Local,
            ..Default::default()
        }
    }

    /// Creates a remote job definition that calls back into an agent
    pub fn remote(name: impl Into<String>, properties: RemoteProperties) -> Self {
        Self {
            name: name.into(),
            job_type: JobType::Remote,
            remote_properties: Some(properties),
            ..Default::default()
        }
    }

    /// Sets the schedule expression
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }
}

/// Run history kept by the coordinator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub success_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    pub error_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempted_run: Option<DateTime<Utc>>,
    pub number_of_finished_runs: u32,
}

/// HTTP call the coordinator makes for a remote job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteProperties {
    pub url: String,
    pub method: String,
    /// Request body attached to the call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Status codes counted as success (e.g. [200, 201])
    pub expected_response_codes: Vec<u16>,
}

/// Job type; an integer on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum JobType {
    #[default]
    Local,
    Remote,
}

impl From<JobType> for u8 {
    fn from(value: JobType) -> Self {
        match value {
            JobType::Local => 0,
            JobType::Remote => 1,
        }
    }
}

impl TryFrom<u8> for JobType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(JobType::Local),
            1 => Ok(JobType::Remote),
            other => Err(format!("unknown job type: {}", other)),
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::Local => write!(f, "Local"),
            JobType::Remote => write!(f, "Remote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_is_integer_on_wire() {
        assert_eq!(serde_json::to_string(&JobType::Local).unwrap(), "0");
        assert_eq!(serde_json::to_string(&JobType::Remote).unwrap(), "1");
        assert!(serde_json::from_str::<JobType>("2").is_err());
    }

    #[test]
    fn test_field_names() {
        let job = JobDefinition {
            template_delimiters: Some("{{ }}".to_string()),
            ..JobDefinition::local("cleanup", "bash cleanup.sh")
                .with_schedule("R/2024-01-01T00:00:00Z/PT1H")
        };

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["name"], "cleanup");
        assert_eq!(value["type"], 0);
        assert_eq!(value["TemplateDelimiters"], "{{ }}");
        assert_eq!(value["resume_at_next_scheduled_time"], false);
        assert!(value.get("id").is_none());
        assert!(value.get("remote_properties").is_none());
    }

    #[test]
    fn test_deserialize_coordinator_job() {
        let json = r#"{
            "name": "report",
            "id": "42",
            "disabled": true,
            "parent_jobs": ["41"],
            "type": 1,
            "remote_properties": {
                "url": "http://agent/private/v1/scheduledJob/report",
                "method": "POST",
                "expected_response_codes": [202]
            },
            "metadata": {
                "success_count": 3,
                "last_success": "2024-05-01T10:00:00Z",
                "number_of_finished_runs": 4
            },
            "unknown_field": "ignored"
        }"#;

        let job: JobDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(job.id.as_deref(), Some("42"));
        assert!(job.disabled);
        assert_eq!(job.parent_jobs, vec!["41".to_string()]);
        assert_eq!(job.job_type, JobType::Remote);
        let remote = job.remote_properties.unwrap();
        assert_eq!(remote.expected_response_codes, vec![202]);
        let metadata = job.metadata.unwrap();
        assert_eq!(metadata.success_count, 3);
        assert!(metadata.last_success.is_some());
    }
}
