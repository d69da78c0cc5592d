//! Extraction error types.

use thiserror::Error;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Content type is not supported by any extractor.
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    /// The bytes could not be parsed as a PDF document.
    #[error("PDF parse error: {0}")]
    DocumentParse(String),

    /// The bytes could not be decoded as an image of the expected format.
    #[error("Image decode error: {0}")]
    Image(String),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
