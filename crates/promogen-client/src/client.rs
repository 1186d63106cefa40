//! HTTP client for the Gemini / Veo generative-media API.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use promogen_models::ImageData;

use crate::error::{ClientError, ClientResult};
use crate::service::MediaService;
use crate::types::{
    ImageRequest, JobFailure, TextRequest, VideoJobHandle, VideoJobStatus, VideoOperation, VideoRequest,
};
use crate::wire::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
    Operation, Part, PredictRequest, VideoImage, VideoInstance, VideoParameters,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons that mean the content was withheld by policy.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
    pub video_model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables. `GEMINI_API_KEY` is required.
    pub fn from_env() -> ClientResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ClientError::config("GEMINI_API_KEY not set"))?;

        let defaults = Self::default();
        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            image_model: std::env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            text_model: std::env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            video_model: std::env::var("GEMINI_VIDEO_MODEL").unwrap_or(defaults.video_model),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> ClientResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::config("API key must not be empty"));
        }

        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<GenerateContentResponse> {
        let url = self.url(&format!("models/{}:generateContent", model));
        debug!(model = %model, "Calling generateContent");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        reject_blocked(&parsed)?;
        Ok(parsed)
    }

    async fn read_operation(response: Response) -> ClientResult<Operation> {
        let response = check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MediaService for GeminiClient {
    async fn generate_image(&self, request: &ImageRequest) -> ClientResult<ImageData> {
        let mut parts = vec![Part::text(&request.prompt)];
        parts.extend(request.reference_images.iter().map(Part::image));

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.as_str().to_string(),
                }),
                ..Default::default()
            },
        };

        let response = self.generate_content(&self.config.image_model, &body).await?;
        extract_image(response)
    }

    async fn generate_text(&self, request: &TextRequest) -> ClientResult<String> {
        let mut parts = vec![Part::text(&request.prompt)];
        if let Some(image) = &request.image {
            parts.push(Part::image(image));
        }

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: Some(request.format.mime_type().to_string()),
                ..Default::default()
            },
        };

        let response = self.generate_content(&self.config.text_model, &body).await?;
        Ok(extract_text(&response))
    }

    async fn submit_video_job(&self, request: &VideoRequest) -> ClientResult<VideoOperation> {
        let url = self.url(&format!("models/{}:predictLongRunning", self.config.video_model));
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image: request.image.as_ref().map(|img| VideoImage {
                    bytes_base64_encoded: img.to_base64(),
                    mime_type: img.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
                resolution: request.resolution.clone(),
                sample_count: 1,
            },
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let operation = Self::read_operation(response).await?;

        info!(job = %operation.name, "Submitted video job");
        Ok(VideoOperation {
            handle: VideoJobHandle(operation.name.clone()),
            status: operation_status(operation),
        })
    }

    async fn poll_video_job(&self, handle: &VideoJobHandle) -> ClientResult<VideoJobStatus> {
        let response = self
            .http
            .get(self.url(handle.as_str()))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        let operation = Self::read_operation(response).await?;
        Ok(operation_status(operation))
    }

    async fn fetch_media(&self, locator: &str) -> ClientResult<Vec<u8>> {
        debug!(locator = %locator, "Fetching media");
        let response = self
            .http
            .get(locator)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Turn a non-2xx response into [`ClientError::Api`], keeping the payload's status code.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (None, body),
    };

    warn!(status = status.as_u16(), code = ?code, "Remote service returned an error");
    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

fn reject_blocked(response: &GenerateContentResponse) -> ClientResult<()> {
    if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
        return Err(ClientError::safety_blocked(format!("prompt blocked ({})", reason)));
    }

    let blocked = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .filter(|reason| BLOCKING_FINISH_REASONS.contains(reason));
    if let Some(reason) = blocked {
        return Err(ClientError::safety_blocked(format!("response withheld ({})", reason)));
    }

    Ok(())
}

fn extract_image(response: GenerateContentResponse) -> ClientResult<ImageData> {
    let parts = response.candidates.into_iter().next().map(|c| c.content.parts).unwrap_or_default();

    let mut fallback_text = None;
    for part in parts {
        if let Some(inline) = part.inline_data {
            let bytes = STANDARD
                .decode(inline.data.as_bytes())
                .map_err(|e| ClientError::invalid_response(format!("Invalid image payload: {}", e)))?;
            return Ok(ImageData::new(inline.mime_type, bytes));
        }
        if fallback_text.is_none() {
            fallback_text = part.text.filter(|t| !t.trim().is_empty());
        }
    }

    Err(ClientError::NoImage(
        fallback_text.unwrap_or_else(|| "No image data returned.".to_string()),
    ))
}

fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .map(|c| c.content.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
        .unwrap_or_default()
}

fn operation_status(operation: Operation) -> VideoJobStatus {
    if !operation.done {
        return VideoJobStatus::Running;
    }

    if let Some(error) = operation.error {
        return VideoJobStatus::Failed(JobFailure {
            code: error.code,
            status: error.status,
            message: error.message,
        });
    }

    let locator = operation
        .response
        .and_then(|r| r.generate_video_response)
        .and_then(|r| r.generated_samples.into_iter().next())
        .and_then(|s| s.video)
        .and_then(|v| v.uri);

    match locator {
        Some(locator) => VideoJobStatus::Succeeded { locator },
        None => VideoJobStatus::Failed(JobFailure::new(
            "Video generation completed but no locator was returned",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_safety_finish_reason_is_blocked() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"SAFETY"}]}"#);
        let err = reject_blocked(&response).unwrap_err();
        assert!(err.is_safety_block());
    }

    #[test]
    fn test_prompt_feedback_block() {
        let response = parse(r#"{"candidates":[],"promptFeedback":{"blockReason":"OTHER"}}"#);
        assert!(reject_blocked(&response).is_err());
    }

    #[test]
    fn test_extract_image_falls_back_to_text() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{"text":"I cannot draw that."}]}}]}"#);
        match extract_image(response) {
            Err(ClientError::NoImage(msg)) => assert_eq!(msg, "I cannot draw that."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{"text":"Hello, "},{"text":"world"}]},"finishReason":"STOP"}]}"#);
        assert_eq!(extract_text(&response), "Hello, world");
    }

    #[test]
    fn test_done_operation_without_locator_fails() {
        let op: Operation = serde_json::from_str(r#"{"name":"operations/1","done":true,"response":{}}"#).unwrap();
        assert!(matches!(operation_status(op), VideoJobStatus::Failed(_)));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(GeminiClient::new(GeminiConfig::default()).is_err());
    }
}
