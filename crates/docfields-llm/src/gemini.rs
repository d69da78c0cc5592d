//! Google Gemini model client.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docfields_core::config::ModelConfig;
use docfields_core::error::{DocfieldsError, DocfieldsResult};
use docfields_core::traits::{ModelClient, ModelInput, ModelRequest, ModelResponse, TokenUsage};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    config: ModelConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a new Gemini client. Fails if the config carries no API key.
    pub fn new(config: ModelConfig) -> DocfieldsResult<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|_| config.has_credential())
            .ok_or_else(|| {
                DocfieldsError::Configuration(
                    "Gemini API key not found. Set the GEMINI_API_KEY environment variable."
                        .to_string(),
                )
            })?;

        let mut headers = reqwest::header::HeaderMap::new();
        let mut key_value: reqwest::header::HeaderValue = api_key
            .expose_secret()
            .parse()
            .map_err(|_| DocfieldsError::Configuration("Invalid API key format".to_string()))?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DocfieldsError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

fn build_request(request: &ModelRequest, temperature: f32) -> GenerateContentRequest {
    let parts = match &request.input {
        ModelInput::Text(text) => vec![Part::Text {
            text: format!("{}\n\n{}", request.instruction, text),
        }],
        ModelInput::Image { data, mime_type } => vec![
            Part::Text {
                text: request.instruction.clone(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: BASE64.encode(data),
                },
            },
        ],
    };

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig { temperature },
    }
}

fn parse_response(status: reqwest::StatusCode, body: &str) -> DocfieldsResult<ModelResponse> {
    if !status.is_success() {
        let message = serde_json::from_str::<ApiError>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        return Err(DocfieldsError::model_invocation(format!(
            "Gemini API error ({}): {}",
            status, message
        )));
    }

    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        DocfieldsError::model_invalid_response(format!("Failed to parse response: {}", e))
    })?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(DocfieldsError::model_invalid_response(format!(
            "Prompt blocked: {}",
            reason
        )));
    }

    let candidate = response.candidates.first().ok_or_else(|| {
        DocfieldsError::model_invalid_response("Response contained no candidates")
    })?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.is_empty() {
        return Err(DocfieldsError::model_invalid_response(format!(
            "Response contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let usage = response.usage_metadata.map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Ok(ModelResponse { text, usage })
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> DocfieldsResult<ModelResponse> {
        let body = build_request(request, self.config.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| DocfieldsError::model_invocation(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            DocfieldsError::model_invocation(format!("Failed to read response body: {}", e))
        })?;
        debug!(status = %status, len = text.len(), "Gemini responded");

        parse_response(status, &text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
