//! JSON payloads exchanged with the service.

use serde::{Deserialize, Serialize};

use promogen_models::ImageData;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: &ImageData) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.to_base64(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Content,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub block_reason: Option<String>,
}

// Video (long-running operations)

#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub(crate) struct VideoInstance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<VideoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoParameters {
    pub aspect_ratio: String,
    pub resolution: String,
    pub sample_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<RpcStatus>,
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcStatus {
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationResponse {
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedSample {
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoRef {
    pub uri: Option<String>,
}

/// `{"error": {...}}` body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: RpcStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text("hi"), Part::image(&ImageData::jpeg(vec![1, 2, 3]))],
            }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE".into()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: "9:16".into(),
                }),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "9:16");
        assert!(json["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_operation_locator_parses() {
        let body = r#"{
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [{"video": {"uri": "https://x/v.mp4"}}]}}
        }"#;
        let op: Operation = serde_json::from_str(body).unwrap();
        let uri = op
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);
        assert_eq!(uri.as_deref(), Some("https://x/v.mp4"));
    }
}
