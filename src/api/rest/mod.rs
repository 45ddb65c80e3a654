//! REST API module for HTTP endpoints
//!
//! - `POST /api/feedings` - Record a feeding
//! - `GET /api/feedings` - List feedings (optional `limit`)
//! - `GET /api/stats` - Aggregate statistics
//! - `POST /api/analyze` - Pattern analysis (optional filter body)
//! - `GET /api/analyze/status` - External engine availability

pub mod analysis;
pub mod feedings;
pub mod stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::FeedingError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL_ERROR".to_string(),
        }
    }

    /// Pair the error with its status code
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for FeedingError {
    fn into_response(self) -> Response {
        match self {
            FeedingError::Validation(e) => {
                ApiError::bad_request(e.to_string()).with_status(StatusCode::BAD_REQUEST)
            }
            FeedingError::Storage(e) => {
                error!(error = %e, "Storage failure while serving request");
                ApiError::internal(e.to_string()).with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
