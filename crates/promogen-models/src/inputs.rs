//! User-supplied inputs shared read-only by every generation flow.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{AspectRatio, ImageData};

/// Maximum number of product or model reference images.
pub const MAX_REFERENCE_IMAGES: usize = 2;

/// Reference images, descriptions and output settings for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationInputs {
    /// Product reference images (ground truth for product appearance)
    pub product_images: Vec<ImageData>,

    /// Product description and photo concept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,

    /// Human model reference images, used by subject categories only
    #[serde(default)]
    pub model_images: Vec<ImageData>,

    /// One optional description per model image
    #[serde(default)]
    pub model_descriptions: Vec<String>,

    /// Output aspect ratio
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    /// Target dialogue language
    pub language: String,
}

impl GenerationInputs {
    pub fn new(product_images: Vec<ImageData>, language: impl Into<String>) -> Self {
        Self {
            product_images,
            product_description: None,
            model_images: Vec::new(),
            model_descriptions: Vec::new(),
            aspect_ratio: AspectRatio::default(),
            language: language.into(),
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_product_description(mut self, description: impl Into<String>) -> Self {
        self.product_description = Some(description.into());
        self
    }

    /// Add a model image with its description (may be empty).
    pub fn with_model(mut self, image: ImageData, description: impl Into<String>) -> Self {
        self.model_images.push(image);
        self.model_descriptions.push(description.into());
        self
    }

    /// Product description, if one was given and is not blank.
    pub fn product_description(&self) -> Option<&str> {
        self.product_description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Non-blank model descriptions, in upload order.
    pub fn model_descriptions(&self) -> Vec<&str> {
        self.model_descriptions
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .collect()
    }

    pub fn has_model_images(&self) -> bool {
        !self.model_images.is_empty()
    }

    /// Validate the inputs before any remote call.
    pub fn validate(&self) -> Result<(), String> {
        if self.product_images.is_empty() {
            return Err("Upload at least one product image first".to_string());
        }
        if self.product_images.len() > MAX_REFERENCE_IMAGES {
            return Err(format!(
                "At most {} product images are supported, got {}",
                MAX_REFERENCE_IMAGES,
                self.product_images.len()
            ));
        }
        if self.model_images.len() > MAX_REFERENCE_IMAGES {
            return Err(format!(
                "At most {} model images are supported, got {}",
                MAX_REFERENCE_IMAGES,
                self.model_images.len()
            ));
        }
        if self.product_images.iter().chain(&self.model_images).any(ImageData::is_empty) {
            return Err("Reference images must not be empty".to_string());
        }
        if self.language.trim().is_empty() {
            return Err("A dialogue language is required".to_string());
        }
        Ok(())
    }
}
