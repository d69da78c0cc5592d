//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub result: HealthResult,
}

#[derive(Debug, Serialize)]
pub struct HealthResult {
    pub number: i32,
}

/// Health check endpoint.
/// GET /
///
/// Runs `SELECT 1` against the store. The cause of a failure is logged,
/// not returned.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let store = state.service.store();

    match store.ping().await {
        Ok(number) => Ok(Json(HealthResponse {
            message: "Database connection OK".to_string(),
            result: HealthResult { number },
        })),
        Err(e) => {
            error!(backend = store.backend_name(), error = %e, "Database health check failed");
            Err(ApiError::internal("Database connection failed"))
        }
    }
}
