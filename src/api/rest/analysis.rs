//! Analysis endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::ApiError;
use crate::api::state::AppState;
use crate::types::RecordFilter;

/// POST /api/analyze - Analyze feeding patterns
///
/// The body is optional; when present it is a `RecordFilter`
/// (`bird_type`, `food_type`, `limit`).
pub async fn analyze(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let filter = if body.iter().all(u8::is_ascii_whitespace) {
        RecordFilter::default()
    } else {
        match serde_json::from_slice::<RecordFilter>(&body) {
            Ok(filter) => filter,
            Err(e) => {
                return ApiError::bad_request(format!("Invalid analysis filter: {}", e))
                    .with_status(StatusCode::BAD_REQUEST)
            }
        }
    };

    match state.service.analyze_filtered(&filter).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/analyze/status - External analysis engine availability
pub async fn engine_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.engine_status())
}
