//! Text generation with bounded retry.
//!
//! This is the only place in the engine that retries: image generation and
//! video submission are attempted once.

use std::sync::Arc;

use promogen_client::{MediaService, TextRequest};
use tracing::info;

use crate::error::{classify_remote_error, EngineError, EngineResult};
use crate::retry::{retry_async, RetryPolicy, RetryResult};

/// Wraps `generate_text` with the configured [`RetryPolicy`].
///
/// Empty responses and transient failures are retried. A safety block or an
/// exhausted quota is surfaced on the first attempt.
#[derive(Clone)]
pub struct TextGenerator {
    service: Arc<dyn MediaService>,
    policy: RetryPolicy,
}

impl TextGenerator {
    pub fn new(service: Arc<dyn MediaService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate non-empty text for `request`.
    pub async fn generate(&self, request: &TextRequest) -> EngineResult<String> {
        let service = &self.service;
        let result = retry_async(
            &self.policy,
            "generate_text",
            |e: &EngineError| e.is_safety_block() || e.is_quota_exhausted(),
            move || async move {
                let text = service
                    .generate_text(request)
                    .await
                    .map_err(classify_remote_error)?;
                if text.trim().is_empty() {
                    return Err(EngineError::generation("Empty response from text model"));
                }
                Ok(text)
            },
        )
        .await;

        match result {
            RetryResult::Success(text) => Ok(text),
            RetryResult::Aborted { error, .. } => Err(error),
            RetryResult::Failed { error, attempts } => {
                info!(attempts, "Text generation gave up: {}", error);
                Err(EngineError::MaxRetries {
                    attempts,
                    last: error.to_string(),
                })
            }
        }
    }
}
