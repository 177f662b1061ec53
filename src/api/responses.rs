//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::StatusSnapshot;

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub action: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: StatusSnapshot,
}

impl ApiResponse {
    pub fn new(action: &str, message: impl Into<String>, session: StatusSnapshot) -> Self {
        Self {
            action: action.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            session,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
