//! Request and response types for the media service.

use std::fmt;

use promogen_models::{AspectRatio, ImageData};
use serde::{Deserialize, Serialize};

use crate::error::mentions_quota;

/// Image generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    /// Reference images, sent after the prompt in order
    pub reference_images: Vec<ImageData>,
    pub aspect_ratio: AspectRatio,
}

/// Expected shape of a text response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    PlainText,
    Json,
}

impl ResponseFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::PlainText => "text/plain",
            ResponseFormat::Json => "application/json",
        }
    }
}

/// Text generation request with an optional image to analyze.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    pub image: Option<ImageData>,
    pub format: ResponseFormat,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            format: ResponseFormat::PlainText,
        }
    }

    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }

    pub fn json(mut self) -> Self {
        self.format = ResponseFormat::Json;
        self
    }
}

/// Video job submission.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub prompt: String,
    /// Still image the video starts from
    pub image: Option<ImageData>,
    pub aspect_ratio: AspectRatio,
    pub resolution: String,
}

/// Opaque handle to a remote video operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoJobHandle(pub String);

impl VideoJobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoJobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error reported by a finished video job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub code: Option<i64>,
    pub status: Option<String>,
    pub message: String,
}

impl JobFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }

    /// Check the payload for a quota signal.
    pub fn is_quota_exhausted(&self) -> bool {
        self.code == Some(429)
            || self.status.as_deref().is_some_and(mentions_quota)
            || mentions_quota(&self.message)
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

/// State of a video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoJobStatus {
    /// Still rendering
    Running,
    /// Done; media can be fetched from `locator`
    Succeeded { locator: String },
    /// Done with an error
    Failed(JobFailure),
}

impl VideoJobStatus {
    pub fn is_done(&self) -> bool {
        !matches!(self, VideoJobStatus::Running)
    }
}

/// Submitted video job and the state reported at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    pub handle: VideoJobHandle,
    pub status: VideoJobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_failure_quota_detection() {
        let failure = JobFailure {
            code: Some(8),
            status: Some("RESOURCE_EXHAUSTED".into()),
            message: "Quota exceeded for aiplatform.googleapis.com".into(),
        };
        assert!(failure.is_quota_exhausted());
        assert!(!JobFailure::new("Invalid prompt").is_quota_exhausted());
    }

    #[test]
    fn test_status_done() {
        assert!(!VideoJobStatus::Running.is_done());
        assert!(VideoJobStatus::Failed(JobFailure::new("x")).is_done());
    }
}
