//! Extraction orchestrator.
//!
//! Runs one upload through a fixed, linear sequence:
//! validate → extract content → invoke model → parse reply → persist.
//! Each step either advances or ends the request with a single
//! [`DocfieldsError`]; nothing is retried here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use docfields_extractors::ExtractionPipeline;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::error::{DocfieldsError, DocfieldsResult};
use crate::traits::{ModelClient, ModelInput, ModelRequest, RecordStore, TokenUsage};
use crate::types::{ExtractedFields, MediaType};

use super::parser::parse_fields;
use super::prompts::extraction_prompt;

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// Fields as parsed from the model reply (the caller-visible result).
    pub fields: ExtractedFields,
    /// Id of the persisted record.
    pub record_id: i64,
    /// Creation time reported by the store.
    pub created_at: DateTime<Utc>,
    /// Token usage, when the model reports it.
    pub usage: Option<TokenUsage>,
}

/// Orchestrates upload validation, model invocation and persistence.
pub struct ExtractionService {
    model: Arc<dyn ModelClient>,
    store: Arc<dyn RecordStore>,
    pipeline: ExtractionPipeline,
    prompt: String,
}

impl ExtractionService {
    /// Create a new service over the given collaborators.
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            model,
            store,
            pipeline: ExtractionPipeline::with_defaults(),
            prompt: extraction_prompt(),
        }
    }

    /// The persistence store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// The model client.
    pub fn model(&self) -> &Arc<dyn ModelClient> {
        &self.model
    }

    /// Check the declared content type and payload size.
    ///
    /// Content type is checked first, so an empty upload of an unsupported
    /// type reports `UnsupportedMediaType`.
    pub fn validate(content_type: &str, payload: &[u8]) -> DocfieldsResult<MediaType> {
        let media = MediaType::from_content_type(content_type).ok_or_else(|| {
            DocfieldsError::UnsupportedMediaType {
                content_type: content_type.to_string(),
            }
        })?;

        if payload.is_empty() {
            return Err(DocfieldsError::EmptyPayload);
        }

        Ok(media)
    }

    /// Run one upload through the full extraction sequence.
    pub async fn extract(
        &self,
        content_type: &str,
        payload: &[u8],
    ) -> DocfieldsResult<ExtractionOutcome> {
        let span = tracing::info_span!(
            "extract",
            request_id = %Uuid::new_v4(),
            content_type = %content_type,
            size = payload.len(),
        );

        async {
            let result = self.run(content_type, payload).await;
            match &result {
                Ok(outcome) => info!(
                    record_id = outcome.record_id,
                    "Extracted fields persisted"
                ),
                Err(e) if e.is_client_error() => warn!(code = e.code().as_str(), "{}", e),
                Err(DocfieldsError::ResponseFormat { message, code, raw }) => {
                    error!(code = code.as_str(), reply = %raw, "{}", message)
                }
                Err(e) => error!(code = e.code().as_str(), "{}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, content_type: &str, payload: &[u8]) -> DocfieldsResult<ExtractionOutcome> {
        let media = Self::validate(content_type, payload)?;
        debug!(media = %media, "Upload validated");

        let input = self.extract_content(media, payload).await?;
        debug!("Content extracted");

        let request = ModelRequest {
            instruction: self.prompt.clone(),
            input,
        };
        let response = self
            .model
            .generate(&request)
            .await
            .map_err(as_model_error)?;
        let usage = response.usage.clone().unwrap_or_default();
        debug!(
            reply_len = response.text.len(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Model replied"
        );

        let fields = parse_fields(&response.text)?;
        debug!("Reply parsed");

        let record = self.store.insert(&fields).await.map_err(as_persistence_error)?;

        Ok(ExtractionOutcome {
            fields,
            record_id: record.id,
            created_at: record.created_at,
            usage: response.usage,
        })
    }

    async fn extract_content(&self, media: MediaType, payload: &[u8]) -> DocfieldsResult<ModelInput> {
        let content = self.pipeline.extract(payload, media.as_mime()).await?;

        if media.is_image() {
            return Ok(ModelInput::Image {
                data: payload.to_vec(),
                mime_type: media.as_mime().to_string(),
            });
        }

        if content.is_empty() {
            return Err(DocfieldsError::UnextractableContent {
                message: format!(
                    "PDF has no extractable text ({} page(s))",
                    content.page_count().unwrap_or(0)
                ),
            });
        }

        Ok(ModelInput::Text(content.text))
    }
}

fn as_model_error(err: DocfieldsError) -> DocfieldsError {
    match err {
        e @ DocfieldsError::ModelInvocation { .. } => e,
        other => DocfieldsError::model_invocation(other.to_string()),
    }
}

fn as_persistence_error(err: DocfieldsError) -> DocfieldsError {
    match err {
        e @ DocfieldsError::Persistence { .. } => e,
        other => DocfieldsError::persistence(other.to_string()),
    }
}
