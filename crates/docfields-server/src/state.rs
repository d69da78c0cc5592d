//! Server state management.

use std::sync::Arc;

use docfields_core::ExtractionService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExtractionService>,
    /// Request body cap applied to the upload route.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(service: ExtractionService, max_upload_bytes: usize) -> Self {
        Self {
            service: Arc::new(service),
            max_upload_bytes,
        }
    }
}
