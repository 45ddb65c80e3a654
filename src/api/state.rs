//! Shared application state for HTTP handlers

use std::sync::Arc;

use crate::service::FeedingService;

/// State handed to every handler
pub struct AppState {
    pub service: Arc<FeedingService>,
}

impl AppState {
    pub fn new(service: Arc<FeedingService>) -> Self {
        Self { service }
    }
}
