//! Locally addressable handles to downloaded videos.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A rendered video that has been downloaded to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoHandle {
    /// Local file holding the video bytes
    pub path: PathBuf,

    /// Remote locator the bytes were fetched from
    pub locator: String,

    /// Downloaded size in bytes
    pub size_bytes: u64,

    /// Download timestamp
    pub created_at: DateTime<Utc>,
}

impl VideoHandle {
    pub fn new(path: PathBuf, locator: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path,
            locator: locator.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }
}
