//! The remote service contract consumed by the engine.

use async_trait::async_trait;
use promogen_models::ImageData;

use crate::error::ClientResult;
use crate::types::{ImageRequest, TextRequest, VideoJobHandle, VideoJobStatus, VideoOperation, VideoRequest};

/// Image, text and video synthesis operations.
///
/// Implementations attempt each call exactly once; retry policy belongs to
/// the caller.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Generate one image.
    async fn generate_image(&self, request: &ImageRequest) -> ClientResult<ImageData>;

    /// Generate text. An empty string is returned as-is; safety rejections
    /// surface as [`crate::ClientError::SafetyBlocked`].
    async fn generate_text(&self, request: &TextRequest) -> ClientResult<String>;

    /// Submit a long-running video job.
    async fn submit_video_job(&self, request: &VideoRequest) -> ClientResult<VideoOperation>;

    /// Fetch the current state of a video job.
    async fn poll_video_job(&self, handle: &VideoJobHandle) -> ClientResult<VideoJobStatus>;

    /// Download bytes from a result locator.
    async fn fetch_media(&self, locator: &str) -> ClientResult<Vec<u8>>;
}
