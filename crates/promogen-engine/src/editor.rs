//! Single-slot operations: angle edits, regenerate, scenario and cinematic
//! text, and slot videos.
//!
//! Every operation takes the slot's lock for its whole duration, so two
//! operations on the same slot run one after the other.

use std::sync::Arc;

use promogen_client::{ImageRequest, MediaService, TextRequest};
use promogen_models::{GenerationInputs, ImageData, ScenarioFocus, SlotKey, StudioEvent, VideoHandle};

use crate::batch::reference_images;
use crate::cancel::CancelToken;
use crate::error::{classify_remote_error, EngineError, EngineResult};
use crate::logging::RunLogger;
use crate::prompt::{
    build_cinematic_prompt, build_edit_prompt, build_generation_prompt, build_scenario_prompt, slot_motion_prompt,
};
use crate::state::{EventBus, SlotStore};
use crate::text::TextGenerator;
use crate::video::VideoPoller;

pub struct SlotEditor {
    service: Arc<dyn MediaService>,
    text: TextGenerator,
    poller: VideoPoller,
    slots: SlotStore,
    events: EventBus,
}

impl SlotEditor {
    pub fn new(
        service: Arc<dyn MediaService>,
        text: TextGenerator,
        poller: VideoPoller,
        slots: SlotStore,
        events: EventBus,
    ) -> Self {
        Self {
            service,
            text,
            poller,
            slots,
            events,
        }
    }

    fn current_image(&self, key: SlotKey) -> EngineResult<ImageData> {
        if !key.exists() {
            return Err(EngineError::UnknownSlot(key));
        }
        self.slots
            .get(&key)
            .and_then(|slot| slot.image)
            .ok_or_else(|| EngineError::validation(format!("Slot {} has no image yet", key)))
    }

    /// Re-shoot the slot image from another camera angle.
    ///
    /// The result is stored under `angle`; variants for other angles are kept.
    pub async fn edit(&self, key: SlotKey, angle: &str, inputs: &GenerationInputs) -> EngineResult<ImageData> {
        if angle.trim().is_empty() {
            return Err(EngineError::validation("Edit label must not be empty"));
        }
        let _guard = self.slots.lock_slot(key).await;
        let source = self.current_image(key)?;

        let logger = RunLogger::new("edit");
        logger.log_start(&format!("{} -> {}", key, angle));

        let mut references = vec![source];
        references.extend(inputs.product_images.iter().cloned());
        let request = ImageRequest {
            prompt: build_edit_prompt(angle),
            reference_images: references,
            aspect_ratio: inputs.aspect_ratio,
        };

        let image = self
            .service
            .generate_image(&request)
            .await
            .map_err(classify_remote_error)?;

        self.slots.update(|board| {
            if let Some(slot) = board.get_mut(&key) {
                slot.add_variant(angle.trim(), image.clone());
            }
        });
        self.events.emit(StudioEvent::SlotUpdated { key });
        logger.log_completion(&key.to_string());
        Ok(image)
    }

    /// Generate a fresh image for the slot.
    ///
    /// On success the image is replaced and scenario, cinematic text, variants
    /// and video are cleared together. On failure the slot is untouched.
    pub async fn regenerate(&self, key: SlotKey, inputs: &GenerationInputs) -> EngineResult<ImageData> {
        inputs.validate().map_err(EngineError::Validation)?;
        let template = key
            .category
            .template(key.index)
            .ok_or(EngineError::UnknownSlot(key))?;

        let _guard = self.slots.lock_slot(key).await;
        let logger = RunLogger::new("regenerate");
        logger.log_start(&key.to_string());

        let request = ImageRequest {
            prompt: build_generation_prompt(template, key.category, inputs),
            reference_images: reference_images(key.category, inputs),
            aspect_ratio: inputs.aspect_ratio,
        };

        let image = match self.service.generate_image(&request).await {
            Ok(image) => image,
            Err(e) => {
                let err = classify_remote_error(e);
                logger.log_error(&err.to_string());
                return Err(err);
            }
        };

        self.slots.update(|board| {
            if let Some(slot) = board.get_mut(&key) {
                slot.replace_image(image.clone());
            }
        });
        self.events.emit(StudioEvent::SlotUpdated { key });
        logger.log_completion(&key.to_string());
        Ok(image)
    }

    /// Write the short video scenario for a slot image.
    pub async fn generate_scenario(
        &self,
        key: SlotKey,
        focus: Option<ScenarioFocus>,
        inputs: &GenerationInputs,
    ) -> EngineResult<String> {
        let _guard = self.slots.lock_slot(key).await;
        let image = self.current_image(key)?;

        let prompt = build_scenario_prompt(key.category, focus, inputs.product_description(), &inputs.language);
        let text = self
            .text
            .generate(&TextRequest::new(prompt).with_image(image))
            .await?;

        self.slots.update(|board| {
            if let Some(slot) = board.get_mut(&key) {
                slot.set_scenario(text.clone());
            }
        });
        self.events.emit(StudioEvent::SlotUpdated { key });
        Ok(text)
    }

    /// Describe the slot image as a cinematic text-to-image prompt.
    pub async fn generate_cinematic(&self, key: SlotKey) -> EngineResult<String> {
        let _guard = self.slots.lock_slot(key).await;
        let image = self.current_image(key)?;

        let text = self
            .text
            .generate(&TextRequest::new(build_cinematic_prompt()).with_image(image))
            .await?;

        self.slots.update(|board| {
            if let Some(slot) = board.get_mut(&key) {
                slot.set_cinematic(text.clone());
            }
        });
        self.events.emit(StudioEvent::SlotUpdated { key });
        Ok(text)
    }

    /// Animate the slot image. The scenario text, if any, drives the motion.
    pub async fn generate_video(
        &self,
        key: SlotKey,
        inputs: &GenerationInputs,
        cancel: &CancelToken,
    ) -> EngineResult<VideoHandle> {
        let _guard = self.slots.lock_slot(key).await;
        let image = self.current_image(key)?;
        let scenario = self.slots.get(&key).and_then(|slot| slot.scenario);
        let prompt = slot_motion_prompt(scenario.as_deref());

        let handle = self
            .poller
            .generate(&key.to_string(), Some(&image), &prompt, inputs.aspect_ratio, cancel)
            .await?;

        self.slots.update(|board| {
            if let Some(slot) = board.get_mut(&key) {
                slot.set_video(handle.clone());
            }
        });
        self.events.emit(StudioEvent::SlotUpdated { key });
        Ok(handle)
    }
}
