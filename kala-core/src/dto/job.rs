//! Job DTOs

use serde::{Deserialize, Serialize};

/// Body returned by the coordinator when a job definition is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddJobResponse {
    pub id: String,
}
