//! Stats endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::state::AppState;

/// GET /api/stats - Aggregate statistics over all feedings
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    match state.service.get_stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => e.into_response(),
    }
}
