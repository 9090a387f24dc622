//! API Module
//!
//! HTTP surface the coordinator uses to trigger and validate jobs.

pub mod error;
pub mod health;
pub mod trigger;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;

/// Create the agent router with all endpoints
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Trigger endpoints
        .route(
            "/private/v1/scheduledJob/{job_name}",
            post(trigger::run_job),
        )
        .route(
            "/private/v1/scheduledJob/{job_name}/validate",
            post(trigger::validate_job),
        )
        // Add state and middleware
        .with_state(dispatcher)
        .layer(TraceLayer::new_for_http())
}
