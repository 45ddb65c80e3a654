//! API module for HTTP endpoints
//!
//! Thin axum layer over `FeedingService`.

pub mod http;
pub mod rest;
pub mod state;

pub use http::create_router;
pub use state::AppState;
