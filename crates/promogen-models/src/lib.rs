//! Shared data models for the Promogen generation engine.
//!
//! This crate provides Serde-serializable types for:
//! - Aspect ratios and the content template catalog
//! - Content slots and their derived artifacts
//! - Story scenes and composite (script + visual) prompts
//! - User-supplied generation inputs
//! - Progress events for progressive UI reveal

pub mod aspect;
pub mod catalog;
pub mod events;
pub mod image;
pub mod inputs;
pub mod prompt;
pub mod scene;
pub mod slot;
pub mod video;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use catalog::{
    Category, CategoryParseError, PromptTemplate, ScenarioFocus, CAMERA_ANGLES, LANGUAGES,
};
pub use events::StudioEvent;
pub use image::ImageData;
pub use inputs::{GenerationInputs, MAX_REFERENCE_IMAGES};
pub use prompt::{CompositePrompt, ScenePrompt};
pub use scene::{SceneBoard, SceneError, SceneId, SceneRecord, SceneRole, MAX_SCENES};
pub use slot::{ContentSlot, SlotBoard, SlotKey};
pub use video::VideoHandle;
