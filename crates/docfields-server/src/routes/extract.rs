//! Document field extraction endpoint.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::debug;

use docfields_core::ExtractedFields;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Name of the multipart field carrying the document.
pub const UPLOAD_FIELD: &str = "file";

/// Extract invoice fields from an uploaded image or PDF.
/// POST /extract-data
///
/// Returns the four parsed fields. Parts other than `file` are ignored.
pub async fn extract_data(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ExtractedFields>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A part without a declared type falls through to UnsupportedMediaType.
        let content_type = field.content_type().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let payload = field.bytes().await?;
        debug!(?filename, content_type = %content_type, size = payload.len(), "Upload received");

        let outcome = state.service.extract(&content_type, &payload).await?;
        return Ok(Json(outcome.fields));
    }

    Err(ApiError::bad_request(format!(
        "Multipart body has no '{}' field",
        UPLOAD_FIELD
    )))
}
