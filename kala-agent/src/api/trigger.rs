//! Trigger API Handlers
//!
//! Endpoints the coordinator calls to run or validate a locally registered
//! job. The request body is the job's parameter string, passed through as is.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::context::ExecutionContext;
use crate::dispatch::{DispatchOutcome, Dispatcher, JobTrigger};

/// Header carrying the coordinator's job id
pub const JOB_ID_HEADER: &str = "nextkala-jobid";

/// Header carrying the execution id
pub const RUN_ID_HEADER: &str = "nextkala-runid";

/// Header carrying the caller's correlation id, echoed on the response
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /private/v1/scheduledJob/{job_name}
/// Queue one execution of a registered job
pub async fn run_job(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(job_name): Path<String>,
    headers: HeaderMap,
    job_params: String,
) -> ApiResult<impl IntoResponse> {
    let job_id = required_header(&headers, JOB_ID_HEADER)?;
    let execution_id = required_header(&headers, RUN_ID_HEADER)?;
    let correlation_id = correlation_id(&headers);

    tracing::info!(
        "Trigger for {} (job {}, execution {}, correlation {})",
        job_name,
        job_id,
        execution_id,
        correlation_id
    );

    let context = ExecutionContext::new().with_correlation_id(correlation_id.as_str());
    let trigger = JobTrigger::new(job_name.as_str(), job_id, execution_id, job_params);

    match dispatcher.dispatch(trigger, context) {
        DispatchOutcome::Accepted => Ok((
            StatusCode::ACCEPTED,
            [(CORRELATION_ID_HEADER, correlation_id)],
        )),
        DispatchOutcome::NotFound => Err(ApiError::NotFound(format!(
            "Job {} is not registered",
            job_name
        ))),
        DispatchOutcome::Rejected(e) => Err(e.into()),
    }
}

/// POST /private/v1/scheduledJob/{job_name}/validate
/// Check a parameter string against a registered job
pub async fn validate_job(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(job_name): Path<String>,
    job_params: String,
) -> (StatusCode, Json<bool>) {
    tracing::debug!("Validating parameters for {}", job_name);

    match dispatcher.validate(&job_name, &job_params) {
        Some(valid) => (StatusCode::OK, Json(valid)),
        None => {
            tracing::warn!("Validation requested for unregistered job {}", job_name);
            (StatusCode::NOT_FOUND, Json(false))
        }
    }
}

fn required_header(headers: &HeaderMap, name: &str) -> ApiResult<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest(format!("Missing or invalid {} header", name)))
}

/// Caller's correlation id, or a fresh one
fn correlation_id(headers: &HeaderMap) -> String {
    [CORRELATION_ID_HEADER, REQUEST_ID_HEADER]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_correlation_id_prefers_correlation_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_static("corr-1"));

        assert_eq!(correlation_id(&headers), "corr-1");
    }

    #[test]
    fn test_correlation_id_falls_back_to_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));

        assert_eq!(correlation_id(&headers), "req-1");
    }

    #[test]
    fn test_correlation_id_is_generated() {
        let generated = correlation_id(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&generated).is_ok());
    }

    #[test]
    fn test_required_header() {
        let mut headers = HeaderMap::new();
        headers.insert(JOB_ID_HEADER, HeaderValue::from_static("J1"));
        headers.insert(RUN_ID_HEADER, HeaderValue::from_static("  "));

        assert_eq!(required_header(&headers, JOB_ID_HEADER).unwrap(), "J1");
        assert!(required_header(&headers, RUN_ID_HEADER).is_err());
    }
}
