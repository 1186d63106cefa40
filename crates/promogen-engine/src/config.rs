//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{Backoff, RetryPolicy};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause between successive image calls in a batch
    pub inter_call_delay: Duration,
    /// Pause between story beat generations
    pub story_step_delay: Duration,
    /// Interval between video job polls
    pub video_poll_interval: Duration,
    /// Give up on a video job after this long
    pub video_max_wait: Duration,
    /// Retry policy for text generation
    pub retry: RetryPolicy,
    /// Video resolution requested from the service
    pub video_resolution: String,
    /// Where downloaded videos are written
    pub output_dir: PathBuf,
    /// Dialogue language used when the caller does not pick one
    pub default_language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inter_call_delay: Duration::from_millis(500),
            story_step_delay: Duration::from_secs(1),
            video_poll_interval: Duration::from_secs(10),
            video_max_wait: Duration::from_secs(600), // 10 minutes
            retry: RetryPolicy::default(),
            video_resolution: "720p".to_string(),
            output_dir: std::env::temp_dir().join("promogen"),
            default_language: "Indonesian".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let backoff = match std::env::var("PROMOGEN_RETRY_BACKOFF").as_deref() {
            Ok("exponential") => Backoff::Exponential,
            _ => Backoff::Linear,
        };

        Self {
            inter_call_delay: Duration::from_millis(env_or("PROMOGEN_INTER_CALL_DELAY_MS", 500)),
            story_step_delay: Duration::from_millis(env_or("PROMOGEN_STORY_STEP_DELAY_MS", 1000)),
            video_poll_interval: Duration::from_secs(env_or("PROMOGEN_VIDEO_POLL_SECS", 10)),
            video_max_wait: Duration::from_secs(env_or("PROMOGEN_VIDEO_MAX_WAIT_SECS", 600)),
            retry: RetryPolicy {
                max_attempts: env_or("PROMOGEN_RETRY_MAX_ATTEMPTS", 3u32).max(1),
                base_delay: Duration::from_millis(env_or("PROMOGEN_RETRY_BASE_DELAY_MS", 2000)),
                backoff,
                ..RetryPolicy::default()
            },
            video_resolution: std::env::var("PROMOGEN_VIDEO_RESOLUTION").unwrap_or(defaults.video_resolution),
            output_dir: std::env::var("PROMOGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            default_language: std::env::var("PROMOGEN_LANGUAGE").unwrap_or(defaults.default_language),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.inter_call_delay, Duration::from_millis(500));
        assert_eq!(config.story_step_delay, Duration::from_secs(1));
        assert_eq!(config.video_poll_interval, Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.video_resolution, "720p");
    }
}
