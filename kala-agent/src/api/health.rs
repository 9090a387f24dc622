//! Health Check API Handler

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::dispatch::Dispatcher;

/// GET /health
/// Reports 503 once the agent has started draining
pub async fn health_check(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    if dispatcher.pool().is_closing() {
        (StatusCode::SERVICE_UNAVAILABLE, "DRAINING")
    } else {
        (StatusCode::OK, "OK")
    }
}
