//! Batch sequencer.
//!
//! Walks the template catalog and generates one image per slot, strictly one
//! call at a time with a fixed pause between calls. A failed slot is logged
//! and left empty; the run carries on.

use std::sync::Arc;
use std::time::Duration;

use promogen_client::{ImageRequest, MediaService};
use promogen_models::{Category, ContentSlot, GenerationInputs, ImageData, SlotKey, StudioEvent};
use serde::Serialize;
use tracing::Instrument;

use crate::error::{classify_remote_error, EngineError, EngineResult};
use crate::logging::RunLogger;
use crate::prompt::build_generation_prompt;
use crate::state::{EventBus, SlotStore};

/// One planned image generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTask {
    pub key: SlotKey,
    pub prompt: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    /// Every prompt built for the run, in task order
    pub prompts: Vec<String>,
    pub succeeded: Vec<SlotKey>,
    pub failed: Vec<(SlotKey, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Build one task per catalog entry, in catalog order.
pub fn plan_tasks(inputs: &GenerationInputs) -> Vec<GenerationTask> {
    SlotKey::catalog()
        .filter_map(|key| {
            let template = key.category.template(key.index)?;
            Some(GenerationTask {
                key,
                prompt: build_generation_prompt(template, key.category, inputs),
            })
        })
        .collect()
}

/// Reference images sent with a generation for `category`.
///
/// Product images always; model images only for categories with a human
/// subject.
pub fn reference_images(category: Category, inputs: &GenerationInputs) -> Vec<ImageData> {
    let mut images = inputs.product_images.clone();
    if category.requires_human_subject() {
        images.extend(inputs.model_images.iter().cloned());
    }
    images
}

pub struct BatchSequencer {
    service: Arc<dyn MediaService>,
    slots: SlotStore,
    events: EventBus,
    inter_call_delay: Duration,
}

impl BatchSequencer {
    pub fn new(service: Arc<dyn MediaService>, slots: SlotStore, events: EventBus, inter_call_delay: Duration) -> Self {
        Self {
            service,
            slots,
            events,
            inter_call_delay,
        }
    }

    /// Generate every catalog slot.
    ///
    /// Fails only on invalid inputs, before any remote call; per-slot failures
    /// are reported in the [`BatchReport`].
    pub async fn run(&self, inputs: &GenerationInputs) -> EngineResult<BatchReport> {
        inputs.validate().map_err(EngineError::Validation)?;

        let logger = RunLogger::new("batch");
        let span = logger.create_span();
        self.run_tasks(inputs, &logger).instrument(span).await
    }

    async fn run_tasks(&self, inputs: &GenerationInputs, logger: &RunLogger) -> EngineResult<BatchReport> {
        self.slots.update(|board| board.reset());

        let tasks = plan_tasks(inputs);
        logger.log_start(&format!("{} tasks", tasks.len()));

        let mut report = BatchReport {
            run_id: logger.run_id().to_string(),
            prompts: tasks.iter().map(|t| t.prompt.clone()).collect(),
            ..BatchReport::default()
        };

        for (position, task) in tasks.into_iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.inter_call_delay).await;
            }

            // Jobs that held this slot across the reset may have written into it.
            let _guard = self.slots.lock_slot(task.key).await;
            self.slots.update(|board| {
                if let Some(slot) = board.get_mut(&task.key) {
                    *slot = ContentSlot::default();
                }
            });

            let request = ImageRequest {
                prompt: task.prompt,
                reference_images: reference_images(task.key.category, inputs),
                aspect_ratio: inputs.aspect_ratio,
            };

            match self.service.generate_image(&request).await {
                Ok(image) => {
                    self.slots.update(|board| {
                        if let Some(slot) = board.get_mut(&task.key) {
                            slot.record_image(image);
                        }
                    });
                    logger.log_progress(&format!("{} ready", task.key));
                    self.events.emit(StudioEvent::SlotUpdated { key: task.key });
                    report.succeeded.push(task.key);
                }
                Err(e) => {
                    let message = classify_remote_error(e).to_string();
                    logger.log_warning(&format!("{} failed: {}", task.key, message));
                    self.events.emit(StudioEvent::slot_failed(task.key, message.clone()));
                    report.failed.push((task.key, message));
                }
            }
        }

        logger.log_completion(&format!(
            "{} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        ));
        self.events
            .emit(StudioEvent::batch_completed(report.succeeded.len(), report.failed.len()));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promogen_models::AspectRatio;

    fn inputs() -> GenerationInputs {
        GenerationInputs::new(vec![ImageData::jpeg(vec![1])], "English")
            .with_aspect_ratio(AspectRatio::Landscape)
            .with_model(ImageData::jpeg(vec![7]), "")
    }

    #[test]
    fn test_plan_tasks_follows_catalog() {
        let tasks = plan_tasks(&inputs());
        let keys: Vec<SlotKey> = tasks.iter().map(|t| t.key).collect();
        let catalog: Vec<SlotKey> = SlotKey::catalog().collect();

        assert_eq!(tasks.len(), 8);
        assert_eq!(keys, catalog);
        assert!(tasks.iter().all(|t| t.prompt.contains("16:9")));
    }

    #[test]
    fn test_reference_images_by_category() {
        let inputs = inputs();
        assert_eq!(reference_images(Category::BRoll, &inputs).len(), 1);
        assert_eq!(reference_images(Category::Ugc, &inputs).len(), 2);
    }
}
