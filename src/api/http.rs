//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::rest::{analysis, feedings, stats};
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health_check))
        .route(
            "/api/feedings",
            post(feedings::create_feeding).get(feedings::list_feedings),
        )
        .route("/api/stats", get(stats::get_stats))
        .route("/api/analyze", post(analysis::analyze))
        .route("/api/analyze/status", get(analysis::engine_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// API information endpoint
async fn api_info() -> Json<Value> {
    Json(json!({
        "name": crate::NAME,
        "version": crate::VERSION,
        "description": "Track bird feeding activities and analyze feeding patterns",
        "endpoints": {
            "POST /api/feedings": "Add a new bird feeding record",
            "GET /api/feedings": "Get bird feeding records (optional ?limit=N)",
            "GET /api/stats": "Get feeding statistics",
            "POST /api/analyze": "Analyze feeding patterns",
            "GET /api/analyze/status": "External analysis engine status"
        },
        "example_post_data": {
            "bird_type": "Robin",
            "food_type": "Seeds",
            "quantity": 25,
            "location": "Backyard feeder",
            "notes": "Morning feeding"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisDispatcher;
    use crate::record_store::{RecordStore, RecordStoreConfig};
    use crate::service::FeedingService;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn test_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::open(RecordStoreConfig::new(temp_dir.path())).unwrap();
        let service = Arc::new(FeedingService::new(store, AnalysisDispatcher::local_only()));
        (create_router(Arc::new(AppState::new(service))), temp_dir)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _temp_dir) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_unavailable_store_maps_to_internal_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::open(RecordStoreConfig::new(temp_dir.path())).unwrap();
        store.mark_unavailable("rollback failed");
        let service = Arc::new(FeedingService::new(store, AnalysisDispatcher::local_only()));
        let app = create_router(Arc::new(AppState::new(service)));

        let requests = [
            Request::builder()
                .uri("/api/feedings")
                .body(Body::empty())
                .unwrap(),
            Request::builder()
                .method("POST")
                .uri("/api/feedings")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"bird_type": "Robin", "food_type": "Seeds", "quantity": 5}"#,
                ))
                .unwrap(),
            Request::builder().uri("/api/stats").body(Body::empty()).unwrap(),
        ];

        for request in requests {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), 500);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let error: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(error["code"], "INTERNAL_ERROR");
            assert!(error["error"].as_str().unwrap().contains("rollback failed"));
        }
    }

    #[tokio::test]
    async fn test_api_info() {
        let (app, _temp_dir) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let info: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(info["name"], "bird-feeding");
    }
}
