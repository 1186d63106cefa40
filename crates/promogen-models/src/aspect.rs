//! Output aspect ratio definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Aspect ratios the remote image model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum AspectRatio {
    /// Standard portrait (9:16) for TikTok/Reels
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    /// Square (1:1)
    #[serde(rename = "1:1")]
    Square,
    /// Widescreen landscape (16:9)
    #[serde(rename = "16:9")]
    Landscape,
    /// Classic portrait (3:4)
    #[serde(rename = "3:4")]
    ClassicPortrait,
    /// Classic landscape (4:3)
    #[serde(rename = "4:3")]
    ClassicLandscape,
}

impl AspectRatio {
    pub const ALL: &'static [AspectRatio] = &[
        AspectRatio::Portrait,
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::ClassicPortrait,
        AspectRatio::ClassicLandscape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::ClassicPortrait => "3:4",
            AspectRatio::ClassicLandscape => "4:3",
        }
    }

    /// Ratio used for video jobs.
    ///
    /// The video model only renders 16:9 or 9:16, so everything that is not
    /// widescreen is rendered as portrait.
    pub fn video_ratio(&self) -> AspectRatio {
        match self {
            AspectRatio::Landscape => AspectRatio::Landscape,
            _ => AspectRatio::Portrait,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.contains(':') {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        AspectRatio::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == trimmed)
            .ok_or_else(|| AspectRatioParseError::Unsupported(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Unsupported aspect ratio: {0}")]
    Unsupported(String),
}
