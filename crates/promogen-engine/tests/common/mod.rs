//! Scripted in-memory media service for engine tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use promogen_client::{
    ClientError, ClientResult, ImageRequest, MediaService, TextRequest, VideoJobHandle, VideoJobStatus,
    VideoOperation, VideoRequest,
};
use promogen_engine::{EngineConfig, RetryPolicy};
use promogen_models::{GenerationInputs, ImageData};
use tokio::time::Instant;

/// One recorded call to the service.
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: &'static str,
    pub at: Instant,
    pub prompt: String,
    pub reference_count: usize,
}

/// Answers calls from per-operation scripts. An empty image script yields a
/// fresh PNG per call; an empty poll script reports success.
#[derive(Default)]
pub struct FakeService {
    images: Mutex<VecDeque<ClientResult<ImageData>>>,
    texts: Mutex<VecDeque<ClientResult<String>>>,
    submissions: Mutex<VecDeque<ClientResult<VideoOperation>>>,
    polls: Mutex<VecDeque<ClientResult<VideoJobStatus>>>,
    calls: Mutex<Vec<Call>>,
}

pub const LOCATOR: &str = "https://media.example/video.mp4";
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42";

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_image(&self, result: ClientResult<ImageData>) {
        self.images.lock().unwrap().push_back(result);
    }

    pub fn push_text(&self, result: ClientResult<String>) {
        self.texts.lock().unwrap().push_back(result);
    }

    pub fn push_submission(&self, result: ClientResult<VideoOperation>) {
        self.submissions.lock().unwrap().push_back(result);
    }

    pub fn push_poll(&self, result: ClientResult<VideoJobStatus>) {
        self.polls.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, kind: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.kind == kind).collect()
    }

    fn record(&self, kind: &'static str, prompt: &str, reference_count: usize) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call {
            kind,
            at: Instant::now(),
            prompt: prompt.to_string(),
            reference_count,
        });
        calls.iter().filter(|c| c.kind == kind).count()
    }
}

#[async_trait]
impl MediaService for FakeService {
    async fn generate_image(&self, request: &ImageRequest) -> ClientResult<ImageData> {
        let n = self.record("image", &request.prompt, request.reference_images.len());
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ImageData::new("image/png", vec![n as u8])))
    }

    async fn generate_text(&self, request: &TextRequest) -> ClientResult<String> {
        self.record("text", &request.prompt, usize::from(request.image.is_some()));
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Generated text".to_string()))
    }

    async fn submit_video_job(&self, request: &VideoRequest) -> ClientResult<VideoOperation> {
        self.record("submit", &request.prompt, usize::from(request.image.is_some()));
        self.submissions.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(VideoOperation {
                handle: VideoJobHandle("operations/test".into()),
                status: VideoJobStatus::Running,
            })
        })
    }

    async fn poll_video_job(&self, handle: &VideoJobHandle) -> ClientResult<VideoJobStatus> {
        self.record("poll", handle.as_str(), 0);
        self.polls.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(VideoJobStatus::Succeeded {
                locator: LOCATOR.to_string(),
            })
        })
    }

    async fn fetch_media(&self, locator: &str) -> ClientResult<Vec<u8>> {
        self.record("fetch", locator, 0);
        Ok(VIDEO_BYTES.to_vec())
    }
}

pub fn quota_error() -> ClientError {
    ClientError::Api {
        status: 429,
        code: Some("RESOURCE_EXHAUSTED".into()),
        message: "Resource has been exhausted (e.g. check quota).".into(),
    }
}

pub fn inputs() -> GenerationInputs {
    GenerationInputs::new(vec![ImageData::jpeg(vec![0xFF, 0xD8])], "Indonesian")
}

pub fn config(output_dir: &std::path::Path) -> EngineConfig {
    EngineConfig {
        output_dir: output_dir.to_path_buf(),
        retry: RetryPolicy::default().with_base_delay(Duration::from_millis(100)),
        ..EngineConfig::default()
    }
}
