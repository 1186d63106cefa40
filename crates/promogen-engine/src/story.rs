//! Auto-story pipeline and scene generation.
//!
//! Scene 1 is the identity anchor. The pipeline asks for a four-beat plan
//! (HOOK, PROBLEM, SOLUTION, CTA) from the anchor image, rewrites scene 1's
//! prompt from the first beat, then generates and appends one image per
//! remaining beat, each anchored on the scene 1 image.

use std::sync::Arc;
use std::time::Duration;

use promogen_client::{ImageRequest, MediaService, TextRequest};
use promogen_models::{
    CompositePrompt, GenerationInputs, ImageData, SceneError, SceneId, ScenePrompt, SceneRecord, SceneRole,
    StudioEvent, VideoHandle,
};
use serde::Deserialize;
use tracing::Instrument;

use crate::cancel::CancelToken;
use crate::error::{classify_remote_error, EngineError, EngineResult};
use crate::logging::RunLogger;
use crate::prompt::{build_consistency_prompt, build_scene_prompt_request, build_story_plan_prompt, compose_video_prompt};
use crate::state::{EventBus, SceneStore};
use crate::text::TextGenerator;
use crate::video::VideoPoller;

/// One beat of the story plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBeat {
    pub role: SceneRole,
    pub script: String,
    pub visual: String,
}

impl StoryBeat {
    pub fn prompt(&self) -> ScenePrompt {
        CompositePrompt::new(Some(self.role), &self.script, &self.visual).into()
    }
}

#[derive(Debug, Deserialize)]
struct RawBeat {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    script_id: String,
    #[serde(default)]
    visual_en: String,
}

/// Outcome of a completed story run.
#[derive(Debug, Clone)]
pub struct StoryReport {
    pub run_id: String,
    pub beats: Vec<StoryBeat>,
    /// Scene ids in beat order (anchor first)
    pub scenes: Vec<SceneId>,
}

/// Strip a surrounding ```json fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse and validate a story plan.
///
/// The plan must hold exactly four beats with a script and a visual each.
/// Roles come from position; a `type` that disagrees with its position makes
/// the plan malformed.
pub fn parse_story_plan(text: &str) -> EngineResult<Vec<StoryBeat>> {
    let raw: Vec<RawBeat> = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| EngineError::malformed_plan(format!("not a JSON array of beats: {}", e)))?;

    if raw.len() != SceneRole::STORY.len() {
        return Err(EngineError::malformed_plan(format!(
            "expected {} beats, got {}",
            SceneRole::STORY.len(),
            raw.len()
        )));
    }

    raw.into_iter()
        .zip(SceneRole::STORY)
        .map(|(beat, role)| {
            if let Some(kind) = beat.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
                match kind.parse::<SceneRole>() {
                    Ok(parsed) if parsed == role => {}
                    _ => {
                        return Err(EngineError::malformed_plan(format!(
                            "beat {} has type {:?}, expected {}",
                            role, kind, role
                        )))
                    }
                }
            }
            if beat.script_id.trim().is_empty() || beat.visual_en.trim().is_empty() {
                return Err(EngineError::malformed_plan(format!("beat {} is missing its script or visual", role)));
            }
            Ok(StoryBeat {
                role,
                script: beat.script_id.trim().to_string(),
                visual: beat.visual_en.trim().to_string(),
            })
        })
        .collect()
}

pub struct StoryPipeline {
    service: Arc<dyn MediaService>,
    text: TextGenerator,
    poller: VideoPoller,
    scenes: SceneStore,
    events: EventBus,
    step_delay: Duration,
}

impl StoryPipeline {
    pub fn new(
        service: Arc<dyn MediaService>,
        text: TextGenerator,
        poller: VideoPoller,
        scenes: SceneStore,
        events: EventBus,
        step_delay: Duration,
    ) -> Self {
        Self {
            service,
            text,
            poller,
            scenes,
            events,
            step_delay,
        }
    }

    /// Run the four-beat story from the anchor scene.
    ///
    /// A malformed plan aborts before the board changes. A failed beat image
    /// aborts the rest of the run; scenes appended so far are kept.
    pub async fn run(&self, inputs: &GenerationInputs) -> EngineResult<StoryReport> {
        let logger = RunLogger::new("story");
        let span = logger.create_span();
        self.run_beats(inputs, &logger).instrument(span).await
    }

    async fn run_beats(&self, inputs: &GenerationInputs, logger: &RunLogger) -> EngineResult<StoryReport> {
        let (anchor_id, seed) = self
            .scenes
            .read(|board| board.first().map(|scene| (scene.id, scene.image.clone())))
            .and_then(|(id, image)| image.map(|image| (id, image)))
            .ok_or_else(|| EngineError::validation("Scene 1 needs an image before running the story"))?;

        logger.log_start(&format!("anchor {}", anchor_id));

        let request = TextRequest::new(build_story_plan_prompt(&inputs.language))
            .with_image(seed.clone())
            .json();
        let plan_text = self.text.generate(&request).await?;
        let beats = match parse_story_plan(&plan_text) {
            Ok(beats) => beats,
            Err(e) => {
                logger.log_error(&e.to_string());
                return Err(e);
            }
        };

        self.scenes.update(|board| {
            board.truncate_to_anchor();
            if let Some(anchor) = board.first_mut() {
                anchor.prompt = beats[0].prompt();
                anchor.role = Some(beats[0].role);
            }
        });
        self.events.emit(StudioEvent::SceneUpdated { id: anchor_id });

        let mut scene_ids = vec![anchor_id];
        for (step, beat) in beats.iter().skip(1).enumerate() {
            if step > 0 {
                tokio::time::sleep(self.step_delay).await;
            }

            let request = ImageRequest {
                prompt: build_consistency_prompt(beat.role, &beat.visual),
                reference_images: vec![seed.clone()],
                aspect_ratio: inputs.aspect_ratio,
            };
            let image = match self.service.generate_image(&request).await {
                Ok(image) => image,
                Err(e) => {
                    let err = classify_remote_error(e);
                    logger.log_error(&format!("{} image failed: {}", beat.role, err));
                    return Err(err);
                }
            };

            let mut record = SceneRecord::new(SceneId(0), Some(beat.role));
            record.image = Some(image);
            record.prompt = beat.prompt();
            let id = self.scenes.update(|board| board.push(record))?;

            logger.log_progress(&format!("{} appended as {}", beat.role, id));
            self.events.emit(StudioEvent::SceneAppended {
                id,
                role: Some(beat.role),
            });
            scene_ids.push(id);
        }

        logger.log_completion(&format!("{} scenes", scene_ids.len()));
        self.events.emit(StudioEvent::StoryCompleted {
            scenes: scene_ids.len(),
        });

        Ok(StoryReport {
            run_id: logger.run_id().to_string(),
            beats,
            scenes: scene_ids,
        })
    }

    /// Image a scene's generation works from: its own, else the first product image.
    fn scene_image(&self, id: SceneId, inputs: &GenerationInputs) -> EngineResult<Option<ImageData>> {
        let image = self
            .scenes
            .read(|board| board.get(id).map(|scene| scene.image.clone()))
            .ok_or(SceneError::NotFound(id))?;
        Ok(image.or_else(|| inputs.product_images.first().cloned()))
    }

    /// Ask for a script and visual prompt for one scene.
    pub async fn generate_scene_prompt(&self, id: SceneId, inputs: &GenerationInputs) -> EngineResult<ScenePrompt> {
        let image = self
            .scene_image(id, inputs)?
            .ok_or_else(|| EngineError::validation("Upload a scene image or a product image first"))?;

        self.scenes.update(|board| board.get_mut(id).map(|scene| scene.loading_prompt = true))?;
        let request = TextRequest::new(build_scene_prompt_request(&inputs.language)).with_image(image);
        let result = self
            .text
            .generate(&request)
            .await
            .map(|text| ScenePrompt::parse(&text));

        self.scenes.update(|board| {
            board.get_mut(id).map(|scene| {
                scene.loading_prompt = false;
                if let Ok(prompt) = &result {
                    scene.prompt = prompt.clone();
                }
            })
        })?;

        let prompt = result?;
        self.events.emit(StudioEvent::SceneUpdated { id });
        Ok(prompt)
    }

    /// Render a scene's prompt into a video.
    pub async fn generate_scene_video(
        &self,
        id: SceneId,
        inputs: &GenerationInputs,
        cancel: &CancelToken,
    ) -> EngineResult<VideoHandle> {
        let prompt = self
            .scenes
            .read(|board| board.get(id).map(|scene| scene.prompt.clone()))
            .ok_or(SceneError::NotFound(id))?;
        if prompt.is_empty() {
            return Err(EngineError::validation("Write or generate a prompt for this scene first"));
        }
        let image = self.scene_image(id, inputs)?;
        let video_prompt = compose_video_prompt(&prompt, &inputs.language);

        self.scenes.update(|board| {
            board.get_mut(id).map(|scene| {
                scene.loading_video = true;
                scene.video = None;
            })
        })?;

        let result = self
            .poller
            .generate(&id.to_string(), image.as_ref(), &video_prompt, inputs.aspect_ratio, cancel)
            .await;

        self.scenes.update(|board| {
            board.get_mut(id).map(|scene| {
                scene.loading_video = false;
                if let Ok(handle) = &result {
                    scene.video = Some(handle.clone());
                }
            })
        })?;

        let handle = result?;
        self.events.emit(StudioEvent::SceneUpdated { id });
        Ok(handle)
    }
}
