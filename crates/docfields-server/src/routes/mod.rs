//! Route definitions for the REST API.

mod extract;
mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/", get(health::health_check))
        // Extraction
        .route(
            "/extract-data",
            post(extract::extract_data).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Attach state
        .with_state(state)
}

pub use extract::*;
pub use health::*;
