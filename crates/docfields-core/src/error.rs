//! Error types for docfields operations.
//!
//! Every failure of an extraction request maps to exactly one variant of
//! [`DocfieldsError`]. The first four variants are caller mistakes; the
//! model, response-format and persistence variants are server-side.

use thiserror::Error;

use docfields_extractors::ExtractError;

/// Result type alias for docfields operations.
pub type DocfieldsResult<T> = Result<T, DocfieldsError>;

/// Main error type for all docfields operations.
#[derive(Error, Debug)]
pub enum DocfieldsError {
    /// Declared content type is not one of the accepted upload types.
    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    /// The upload has zero bytes.
    #[error("Empty payload")]
    EmptyPayload,

    /// Image bytes failed to decode.
    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    /// PDF could not be parsed or contains no text.
    #[error("Unextractable content: {message}")]
    UnextractableContent { message: String },

    /// The model call failed or no model is configured.
    #[error("Model invocation error: {message}")]
    ModelInvocation {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The model reply is not the expected JSON after fence stripping.
    #[error("Response format error: {message}")]
    ResponseFormat {
        message: String,
        code: ErrorCode,
        /// The offending reply text, for diagnostics only.
        raw: String,
    },

    /// Insert or commit failed; the transaction was rolled back.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Upload validation (VAL_xxx)
    ValUnsupportedMediaType,
    ValEmptyPayload,
    ValInvalidImage,
    ValUnextractableContent,

    // Model (LLM_xxx)
    LlmNotConfigured,
    LlmRequestFailed,
    LlmInvalidResponse,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidShape,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Other
    Configuration,
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValUnsupportedMediaType => "VAL_001",
            ErrorCode::ValEmptyPayload => "VAL_002",
            ErrorCode::ValInvalidImage => "VAL_003",
            ErrorCode::ValUnextractableContent => "VAL_004",
            ErrorCode::LlmNotConfigured => "LLM_001",
            ErrorCode::LlmRequestFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidShape => "PARSE_002",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::Configuration => "CFG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl DocfieldsError {
    /// Create a model invocation error.
    pub fn model_invocation(message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            message: message.into(),
            code: ErrorCode::LlmRequestFailed,
            source: None,
        }
    }

    /// Create a model error for a reply that carries no usable text.
    pub fn model_invalid_response(message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            message: message.into(),
            code: ErrorCode::LlmInvalidResponse,
            source: None,
        }
    }

    /// Create a model error for a missing credential.
    pub fn model_not_configured(message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            message: message.into(),
            code: ErrorCode::LlmNotConfigured,
            source: None,
        }
    }

    /// Create a response format error for a reply that is not JSON.
    pub fn response_format(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ResponseFormat {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
            raw: raw.into(),
        }
    }

    /// Create a response format error for valid JSON of the wrong shape.
    pub fn response_shape(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ResponseFormat {
            message: message.into(),
            code: ErrorCode::ParseInvalidShape,
            raw: raw.into(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a persistence error that keeps the driver error as source.
    pub fn persistence_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a store connection error.
    pub fn db_connection(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbConnectionFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedMediaType { .. } => ErrorCode::ValUnsupportedMediaType,
            Self::EmptyPayload => ErrorCode::ValEmptyPayload,
            Self::InvalidImage { .. } => ErrorCode::ValInvalidImage,
            Self::UnextractableContent { .. } => ErrorCode::ValUnextractableContent,
            Self::ModelInvocation { code, .. } => *code,
            Self::ResponseFormat { code, .. } => *code,
            Self::Persistence { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::Configuration,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the caller is at fault (bad upload) rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMediaType { .. }
                | Self::EmptyPayload
                | Self::InvalidImage { .. }
                | Self::UnextractableContent { .. }
        )
    }
}

impl From<ExtractError> for DocfieldsError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedType(content_type) => {
                Self::UnsupportedMediaType { content_type }
            }
            ExtractError::DocumentParse(message) => Self::UnextractableContent {
                message: format!("PDF could not be parsed: {}", message),
            },
            ExtractError::Image(message) => Self::InvalidImage { message },
            ExtractError::TaskJoin(e) => Self::Internal(format!("Extraction task failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(DocfieldsError::EmptyPayload.is_client_error());
        assert!(DocfieldsError::InvalidImage {
            message: "bad".to_string()
        }
        .is_client_error());
        assert!(!DocfieldsError::persistence("boom").is_client_error());
        assert!(!DocfieldsError::model_invocation("down").is_client_error());
    }

    #[test]
    fn test_model_not_configured_code() {
        let err = DocfieldsError::model_not_configured("GEMINI_API_KEY is not set");
        assert_eq!(err.code(), ErrorCode::LlmNotConfigured);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_from_extract_error() {
        let err: DocfieldsError = ExtractError::DocumentParse("bad xref".to_string()).into();
        assert!(matches!(err, DocfieldsError::UnextractableContent { .. }));
        assert!(err.to_string().contains("bad xref"));

        let err: DocfieldsError = ExtractError::Image("truncated".to_string()).into();
        assert!(matches!(err, DocfieldsError::InvalidImage { .. }));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValEmptyPayload.as_str(), "VAL_002");
        assert_eq!(ErrorCode::DbOperationFailed.as_str(), "DB_002");
    }
}
