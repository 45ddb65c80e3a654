//! Feeding endpoints

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::ApiError;
use crate::api::state::AppState;
use crate::types::NewFeeding;

/// Query parameters for listing feedings
#[derive(Debug, Deserialize)]
pub struct ListFeedingsParams {
    /// Only the most recent `limit` feedings
    pub limit: Option<usize>,
}

/// POST /api/feedings - Record a new feeding
pub async fn create_feeding(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewFeeding>, JsonRejection>,
) -> Response {
    let new = match payload {
        Ok(Json(new)) => new,
        Err(rejection) => {
            return ApiError::bad_request(rejection.body_text()).with_status(StatusCode::BAD_REQUEST)
        }
    };

    // The append fsyncs, so keep it off the async workers
    let service = Arc::clone(&state.service);
    match tokio::task::spawn_blocking(move || service.record_feeding(new)).await {
        Ok(Ok(record)) => (StatusCode::CREATED, Json(record)).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(join_err) => ApiError::internal(join_err.to_string())
            .with_status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/feedings - List feedings, oldest first
pub async fn list_feedings(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListFeedingsParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return ApiError::bad_request(rejection.body_text()).with_status(StatusCode::BAD_REQUEST)
        }
    };

    match state.service.get_feedings(params.limit) {
        Ok(records) => Json(records).into_response(),
        Err(e) => e.into_response(),
    }
}
