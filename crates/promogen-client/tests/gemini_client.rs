//! GeminiClient tests against a mock HTTP server.

use std::time::Duration;

use promogen_client::{
    ClientError, GeminiClient, GeminiConfig, ImageRequest, MediaService, TextRequest, VideoJobHandle,
    VideoJobStatus, VideoRequest,
};
use promogen_models::{AspectRatio, ImageData};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";

fn client_for(server: &MockServer) -> GeminiClient {
    let config = GeminiConfig {
        api_key: KEY.to_string(),
        timeout: Duration::from_secs(5),
        ..GeminiConfig::default()
    }
    .with_base_url(server.uri());
    GeminiClient::new(config).unwrap()
}

#[tokio::test]
async fn test_generate_image_sends_references_and_ratio() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash-image:generateContent"))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": {"aspectRatio": "16:9"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                ]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let image = client
        .generate_image(&ImageRequest {
            prompt: "A bottle on marble".into(),
            reference_images: vec![ImageData::jpeg(vec![9, 9])],
            aspect_ratio: AspectRatio::Landscape,
        })
        .await
        .unwrap();

    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_generate_text_safety_block() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "SAFETY"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_text(&TextRequest::new("Describe the product"))
        .await
        .unwrap_err();

    assert!(err.is_safety_block());
    assert!(err.is_terminal());
}

#[tokio::test]
async fn test_generate_text_requests_json_mime_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "[]"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .generate_text(&TextRequest::new("plan").json())
        .await
        .unwrap();
    assert_eq!(text, "[]");
}

#[tokio::test]
async fn test_unparseable_body_is_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_text(&TextRequest::new("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Json(_)), "unexpected error: {:?}", err);
    assert!(!err.is_terminal());
}

#[tokio::test]
async fn test_quota_error_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_text(&TextRequest::new("hi"))
        .await
        .unwrap_err();

    match &err {
        ClientError::Api { status, code, message } => {
            assert_eq!(*status, 429);
            assert_eq!(code.as_deref(), Some("RESOURCE_EXHAUSTED"));
            assert_eq!(message, "Quota exceeded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_quota_exhausted());
}

#[tokio::test]
async fn test_video_submit_poll_and_fetch() {
    let server = MockServer::start().await;
    let locator = format!("{}/files/video.mp4", server.uri());

    Mock::given(method("POST"))
        .and(path("/models/veo-3.1-fast-generate-preview:predictLongRunning"))
        .and(body_partial_json(json!({
            "instances": [{"prompt": "Slow pan"}],
            "parameters": {"aspectRatio": "9:16", "resolution": "720p", "sampleCount": 1}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/veo/operations/op-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/models/veo/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/veo/operations/op-1",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [{"video": {"uri": locator}}]}}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/video.mp4"))
        .and(header("x-goog-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 0, 0, 24]))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let op = client
        .submit_video_job(&VideoRequest {
            prompt: "Slow pan".into(),
            image: Some(ImageData::jpeg(vec![1])),
            aspect_ratio: AspectRatio::Portrait,
            resolution: "720p".into(),
        })
        .await
        .unwrap();

    assert_eq!(op.handle, VideoJobHandle("models/veo/operations/op-1".into()));
    assert_eq!(op.status, VideoJobStatus::Running);

    let status = client.poll_video_job(&op.handle).await.unwrap();
    let VideoJobStatus::Succeeded { locator: found } = status else {
        panic!("expected success, got {:?}", status);
    };
    assert_eq!(found, locator);

    let bytes = client.fetch_media(&found).await.unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 24]);
}

#[tokio::test]
async fn test_video_job_error_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operations/op-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-2",
            "done": true,
            "error": {"code": 8, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let status = client_for(&server)
        .poll_video_job(&VideoJobHandle("operations/op-2".into()))
        .await
        .unwrap();

    match status {
        VideoJobStatus::Failed(failure) => assert!(failure.is_quota_exhausted()),
        other => panic!("unexpected status: {:?}", other),
    }
}
