//! Model client trait and related types.

use async_trait::async_trait;

use crate::error::DocfieldsResult;

/// Content sent to the model alongside the instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInput {
    /// Text extracted from a document.
    Text(String),
    /// Raw image bytes with their declared MIME type.
    Image { data: Vec<u8>, mime_type: String },
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Fixed extraction instruction.
    pub instruction: String,
    /// Document content.
    pub input: ModelInput,
}

impl ModelRequest {
    /// Request over extracted document text.
    pub fn text(instruction: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            input: ModelInput::Text(text.into()),
        }
    }

    /// Request over raw image bytes.
    pub fn image(
        instruction: impl Into<String>,
        data: Vec<u8>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            input: ModelInput::Image {
                data,
                mime_type: mime_type.into(),
            },
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
}

/// Reply from the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// Free-form reply text.
    pub text: String,
    /// Token usage statistics.
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    /// Reply with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// Generative model client.
///
/// Implementations must report every failure, including a missing
/// credential, as [`crate::DocfieldsError::ModelInvocation`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Submit the request and return the reply text.
    async fn generate(&self, request: &ModelRequest) -> DocfieldsResult<ModelResponse>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}
