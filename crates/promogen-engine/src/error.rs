//! Engine error types.

use std::time::Duration;

use promogen_client::{ClientError, JobFailure};
use promogen_models::{SceneError, SlotKey};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Message shown when the remote service runs out of quota.
pub const QUOTA_MESSAGE: &str =
    "Remote quota exhausted (429). Check your billing plan or wait for the quota to reset.";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Blocked by safety policy: {0}")]
    SafetyBlocked(String),

    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    MaxRetries { attempts: u32, last: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("{0}")]
    QuotaExhausted(String),

    #[error("Video job failed: {0}")]
    VideoJob(String),

    #[error("Video job timed out after {elapsed:?}")]
    JobTimedOut { elapsed: Duration },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Malformed story plan: {0}")]
    MalformedPlan(String),

    #[error("Unknown slot: {0}")]
    UnknownSlot(SlotKey),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Remote service error: {0}")]
    Client(#[from] ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn malformed_plan(msg: impl Into<String>) -> Self {
        Self::MalformedPlan(msg.into())
    }

    pub fn quota_exhausted() -> Self {
        Self::QuotaExhausted(QUOTA_MESSAGE.to_string())
    }

    /// Check if error is a safety/policy rejection.
    pub fn is_safety_block(&self) -> bool {
        match self {
            EngineError::SafetyBlocked(_) => true,
            EngineError::Client(e) => e.is_safety_block(),
            _ => false,
        }
    }

    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, EngineError::QuotaExhausted(_))
    }

    /// Check if error is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Client(e) => !e.is_terminal(),
            EngineError::Generation(_) => true,
            _ => false,
        }
    }
}

/// Map a remote failure onto the engine's error kinds.
///
/// Quota exhaustion gets its own kind; safety rejections keep their reason;
/// everything else keeps the service's message.
pub fn classify_remote_error(err: ClientError) -> EngineError {
    if err.is_quota_exhausted() {
        return EngineError::quota_exhausted();
    }
    match err {
        ClientError::SafetyBlocked(reason) => EngineError::SafetyBlocked(reason),
        other => EngineError::Client(other),
    }
}

/// Map a failed video job payload onto the engine's error kinds.
pub fn classify_job_failure(failure: JobFailure) -> EngineError {
    if failure.is_quota_exhausted() {
        EngineError::quota_exhausted()
    } else {
        EngineError::VideoJob(failure.to_string())
    }
}
