//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use mockall::mock;
use promogen_client::{
    ClientResult, ImageRequest, MediaService, TextRequest, VideoJobHandle, VideoJobStatus, VideoOperation,
    VideoRequest,
};
use promogen_models::ImageData;

mock! {
    pub MediaService {}

    #[async_trait]
    impl MediaService for MediaService {
        async fn generate_image(&self, request: &ImageRequest) -> ClientResult<ImageData>;
        async fn generate_text(&self, request: &TextRequest) -> ClientResult<String>;
        async fn submit_video_job(&self, request: &VideoRequest) -> ClientResult<VideoOperation>;
        async fn poll_video_job(&self, handle: &VideoJobHandle) -> ClientResult<VideoJobStatus>;
        async fn fetch_media(&self, locator: &str) -> ClientResult<Vec<u8>>;
    }
}
