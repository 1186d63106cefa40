//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Marker the service uses for quota exhaustion.
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Safety block: {0}")]
    SafetyBlocked(String),

    #[error("No image data returned: {0}")]
    NoImage(String),

    #[error("Remote service returned {status}: {message}")]
    Api {
        status: u16,
        /// Status code string from the error payload (e.g. `RESOURCE_EXHAUSTED`)
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn safety_blocked(reason: impl Into<String>) -> Self {
        Self::SafetyBlocked(reason.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Content was rejected by the service's safety policy.
    pub fn is_safety_block(&self) -> bool {
        matches!(self, ClientError::SafetyBlocked(_))
    }

    /// Check if the failure signals exhausted quota (HTTP 429 / `RESOURCE_EXHAUSTED`).
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            ClientError::Api { status, code, .. }
                if *status == 429 || code.as_deref() == Some(RESOURCE_EXHAUSTED) =>
            {
                true
            }
            ClientError::Network(e) if e.status().map(|s| s.as_u16()) == Some(429) => true,
            other => mentions_quota(&other.to_string()),
        }
    }

    /// Failures that retrying cannot fix.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::SafetyBlocked(_) | ClientError::Config(_))
    }
}

/// Check free-form error text for a quota signal.
pub(crate) fn mentions_quota(text: &str) -> bool {
    text.contains(RESOURCE_EXHAUSTED) || text.contains("429")
}
