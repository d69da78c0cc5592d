//! Factory for creating model clients.

use std::sync::Arc;

use tracing::warn;

use docfields_core::config::ModelConfig;
use docfields_core::error::DocfieldsResult;
use docfields_core::traits::ModelClient;

use crate::gemini::GeminiClient;
use crate::unconfigured::UnconfiguredModel;

/// Factory for creating model clients.
pub struct ModelFactory;

impl ModelFactory {
    /// Create a model client from configuration.
    ///
    /// Without a credential this returns an [`UnconfiguredModel`] so the
    /// service still starts; extraction requests then fail individually.
    pub fn from_config(config: &ModelConfig) -> DocfieldsResult<Arc<dyn ModelClient>> {
        if !config.has_credential() {
            warn!("GEMINI_API_KEY not set; extraction requests will fail until it is configured");
            return Ok(Arc::new(UnconfiguredModel::new(config.model.clone())));
        }

        Ok(Arc::new(GeminiClient::new(config.clone())?))
    }

    /// Create a Gemini client with a specific model.
    pub fn gemini_with_model(
        config: &ModelConfig,
        model: impl Into<String>,
    ) -> DocfieldsResult<Arc<dyn ModelClient>> {
        let config = ModelConfig {
            model: model.into(),
            ..config.clone()
        };
        Self::from_config(&config)
    }
}
