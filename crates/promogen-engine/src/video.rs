//! Async video job poller.
//!
//! Submits a video job, polls it on a fixed interval until it is done, then
//! downloads the result to `output_dir`. The wait is bounded by
//! `video_max_wait` and can be cancelled through a [`CancelToken`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use promogen_client::{MediaService, VideoJobStatus, VideoRequest};
use promogen_models::{AspectRatio, ImageData, StudioEvent, VideoHandle};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{classify_job_failure, classify_remote_error, EngineError, EngineResult};
use crate::logging::RunLogger;
use crate::state::EventBus;

/// Drives one video job from submission to a local file.
#[derive(Clone)]
pub struct VideoPoller {
    service: Arc<dyn MediaService>,
    events: EventBus,
    poll_interval: Duration,
    max_wait: Duration,
    resolution: String,
    output_dir: PathBuf,
}

impl VideoPoller {
    pub fn new(service: Arc<dyn MediaService>, config: &EngineConfig, events: EventBus) -> Self {
        Self {
            service,
            events,
            poll_interval: config.video_poll_interval,
            max_wait: config.video_max_wait,
            resolution: config.video_resolution.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    /// Render `prompt` (optionally starting from `still`) into a video.
    ///
    /// `target` names what the video belongs to (a slot or scene) and is used
    /// for logging and the output file name. The aspect ratio is mapped to
    /// the ratios the video model supports.
    pub async fn generate(
        &self,
        target: &str,
        still: Option<&ImageData>,
        prompt: &str,
        aspect_ratio: AspectRatio,
        cancel: &CancelToken,
    ) -> EngineResult<VideoHandle> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if prompt.trim().is_empty() {
            return Err(EngineError::validation("Video prompt must not be empty"));
        }

        let logger = RunLogger::new("video");
        logger.log_start(target);

        let request = VideoRequest {
            prompt: prompt.to_string(),
            image: still.cloned(),
            aspect_ratio: aspect_ratio.video_ratio(),
            resolution: self.resolution.clone(),
        };

        let started = Instant::now();
        let operation = self
            .service
            .submit_video_job(&request)
            .await
            .map_err(classify_remote_error)?;
        let job = operation.handle;
        let mut status = operation.status;
        let mut polls = 0u32;

        let locator = loop {
            match status {
                VideoJobStatus::Succeeded { locator } => break locator,
                VideoJobStatus::Failed(failure) => {
                    logger.log_error(&failure.to_string());
                    return Err(classify_job_failure(failure));
                }
                VideoJobStatus::Running => {}
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.cancelled() => {
                    logger.log_warning(&format!("cancelled after {} polls", polls));
                    return Err(EngineError::Cancelled);
                }
            }

            let elapsed = started.elapsed();
            if elapsed > self.max_wait {
                logger.log_error(&format!("gave up after {:?}", elapsed));
                return Err(EngineError::JobTimedOut { elapsed });
            }

            polls += 1;
            status = self
                .service
                .poll_video_job(&job)
                .await
                .map_err(classify_remote_error)?;

            if !status.is_done() {
                debug!(job = %job, attempt = polls, "Video job still running");
                self.events.emit(StudioEvent::VideoPolled {
                    job: job.to_string(),
                    attempt: polls,
                });
            }
        };

        let bytes = self
            .service
            .fetch_media(&locator)
            .await
            .map_err(classify_remote_error)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(format!("{}-{}.mp4", sanitize(target), Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await?;

        info!(job = %job, polls, path = %path.display(), "Video downloaded");
        logger.log_completion(&format!("{} bytes after {} polls", bytes.len(), polls));
        Ok(VideoHandle::new(path, locator, bytes.len() as u64))
    }
}

fn sanitize(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockMediaService;
    use promogen_client::{JobFailure, VideoJobHandle, VideoOperation};

    fn config(dir: &std::path::Path) -> EngineConfig {
        EngineConfig {
            output_dir: dir.to_path_buf(),
            ..EngineConfig::default()
        }
    }

    fn running() -> VideoOperation {
        VideoOperation {
            handle: VideoJobHandle("operations/1".into()),
            status: VideoJobStatus::Running,
        }
    }

    #[test]
    fn test_sanitize_target() {
        assert_eq!(sanitize("B-Roll-0"), "B-Roll-0");
        assert_eq!(sanitize("scene 2/x"), "scene_2_x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaService::new();
        mock.expect_submit_video_job().times(1).returning(|_| {
            Err(promogen_client::ClientError::Api {
                status: 429,
                code: None,
                message: "Too many requests".into(),
            })
        });

        let poller = VideoPoller::new(Arc::new(mock), &config(dir.path()), EventBus::new());
        let err = poller
            .generate("B-Roll-0", None, "pan", AspectRatio::Portrait, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(err.is_quota_exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_error_keeps_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaService::new();
        mock.expect_submit_video_job().returning(|_| Ok(running()));
        mock.expect_poll_video_job()
            .times(1)
            .returning(|_| Ok(VideoJobStatus::Failed(JobFailure::new("Audio could not be generated"))));

        let poller = VideoPoller::new(Arc::new(mock), &config(dir.path()), EventBus::new());
        let err = poller
            .generate("scene-1", None, "pan", AspectRatio::Portrait, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::VideoJob(ref m) if m.contains("Audio could not be generated")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_wait_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaService::new();
        mock.expect_submit_video_job().returning(|_| Ok(running()));
        mock.expect_poll_video_job().returning(|_| Ok(VideoJobStatus::Running));

        let config = EngineConfig {
            video_max_wait: Duration::from_secs(35),
            ..config(dir.path())
        };
        let poller = VideoPoller::new(Arc::new(mock), &config, EventBus::new());
        let err = poller
            .generate("scene-1", None, "pan", AspectRatio::Portrait, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::JobTimedOut { elapsed } if elapsed >= Duration::from_secs(35)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaService::new();
        mock.expect_submit_video_job().returning(|_| Ok(running()));
        mock.expect_poll_video_job().times(0);

        let poller = VideoPoller::new(Arc::new(mock), &config(dir.path()), EventBus::new());
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let err = poller
            .generate("scene-1", None, "pan", AspectRatio::Portrait, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_submit() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaService::new();
        mock.expect_submit_video_job().times(0);

        let poller = VideoPoller::new(Arc::new(mock), &config(dir.path()), EventBus::new());
        let err = poller
            .generate("scene-1", None, "  ", AspectRatio::Portrait, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
