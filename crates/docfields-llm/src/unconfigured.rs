//! Placeholder client used when no model credential is configured.

use async_trait::async_trait;

use docfields_core::error::{DocfieldsError, DocfieldsResult};
use docfields_core::traits::{ModelClient, ModelRequest, ModelResponse};

/// Model client that fails every request with a configuration message.
///
/// Lets the service start and answer health probes without a credential.
pub struct UnconfiguredModel {
    model: String,
}

impl UnconfiguredModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelClient for UnconfiguredModel {
    async fn generate(&self, _request: &ModelRequest) -> DocfieldsResult<ModelResponse> {
        Err(DocfieldsError::model_not_configured(
            "Model credential is not configured. Set GEMINI_API_KEY.",
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfields_core::ErrorCode;

    #[tokio::test]
    async fn test_every_request_fails_as_model_invocation() {
        let model = UnconfiguredModel::new("gemini-2.5-flash");
        let err = model
            .generate(&ModelRequest::text("extract", "text"))
            .await
            .unwrap_err();

        assert!(matches!(err, DocfieldsError::ModelInvocation { .. }));
        assert_eq!(err.code(), ErrorCode::LlmNotConfigured);
        assert_eq!(model.model_name(), "gemini-2.5-flash");
    }
}
