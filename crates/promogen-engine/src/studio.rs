//! The `Studio` facade.
//!
//! Owns the slot and scene boards, builds every component around a single
//! shared [`MediaService`], and publishes progress on one event bus.

use std::sync::Arc;

use promogen_client::MediaService;
use promogen_models::{
    ContentSlot, GenerationInputs, ImageData, ScenarioFocus, SceneBoard, SceneId, ScenePrompt, SlotBoard, SlotKey,
    StudioEvent, VideoHandle,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::batch::{BatchReport, BatchSequencer};
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::editor::SlotEditor;
use crate::error::EngineResult;
use crate::state::{EventBus, SceneStore, SlotStore};
use crate::story::{StoryPipeline, StoryReport};
use crate::text::TextGenerator;
use crate::video::VideoPoller;

pub struct Studio {
    config: EngineConfig,
    slots: SlotStore,
    scenes: SceneStore,
    events: EventBus,
    batch: BatchSequencer,
    editor: SlotEditor,
    story: StoryPipeline,
}

impl Studio {
    pub fn new(service: Arc<dyn MediaService>, config: EngineConfig) -> Self {
        let slots = SlotStore::new();
        let scenes = SceneStore::new();
        let events = EventBus::new();

        let text = TextGenerator::new(service.clone(), config.retry.clone());
        let poller = VideoPoller::new(service.clone(), &config, events.clone());

        let batch = BatchSequencer::new(service.clone(), slots.clone(), events.clone(), config.inter_call_delay);
        let editor = SlotEditor::new(
            service.clone(),
            text.clone(),
            poller.clone(),
            slots.clone(),
            events.clone(),
        );
        let story = StoryPipeline::new(
            service,
            text,
            poller,
            scenes.clone(),
            events.clone(),
            config.story_step_delay,
        );

        info!(
            inter_call_delay = ?config.inter_call_delay,
            poll_interval = ?config.video_poll_interval,
            "Studio ready"
        );

        Self {
            config,
            slots,
            scenes,
            events,
            batch,
            editor,
            story,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Receive progress events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.events.subscribe()
    }

    // Slots

    pub async fn run_batch(&self, inputs: &GenerationInputs) -> EngineResult<BatchReport> {
        self.batch.run(inputs).await
    }

    pub async fn edit_slot(&self, key: SlotKey, angle: &str, inputs: &GenerationInputs) -> EngineResult<ImageData> {
        self.editor.edit(key, angle, inputs).await
    }

    pub async fn regenerate_slot(&self, key: SlotKey, inputs: &GenerationInputs) -> EngineResult<ImageData> {
        self.editor.regenerate(key, inputs).await
    }

    pub async fn generate_scenario(
        &self,
        key: SlotKey,
        focus: Option<ScenarioFocus>,
        inputs: &GenerationInputs,
    ) -> EngineResult<String> {
        self.editor.generate_scenario(key, focus, inputs).await
    }

    pub async fn generate_cinematic(&self, key: SlotKey) -> EngineResult<String> {
        self.editor.generate_cinematic(key).await
    }

    pub async fn generate_slot_video(
        &self,
        key: SlotKey,
        inputs: &GenerationInputs,
        cancel: &CancelToken,
    ) -> EngineResult<VideoHandle> {
        self.editor.generate_video(key, inputs, cancel).await
    }

    pub fn slot(&self, key: &SlotKey) -> Option<ContentSlot> {
        self.slots.get(key)
    }

    pub fn slots(&self) -> SlotBoard {
        self.slots.snapshot()
    }

    // Scenes

    pub fn scenes(&self) -> SceneBoard {
        self.scenes.snapshot()
    }

    pub fn add_scene(&self) -> EngineResult<SceneId> {
        let id = self.scenes.update(|board| board.add_scene())?;
        self.events.emit(StudioEvent::SceneAppended { id, role: None });
        Ok(id)
    }

    pub fn remove_scene(&self, id: SceneId) -> EngineResult<()> {
        self.scenes.update(|board| board.remove_scene(id))?;
        Ok(())
    }

    /// Replace a scene's image; its video is dropped.
    pub fn set_scene_image(&self, id: SceneId, image: ImageData) -> EngineResult<()> {
        self.scenes.update(|board| board.set_image(id, image))?;
        self.events.emit(StudioEvent::SceneUpdated { id });
        Ok(())
    }

    /// Set a scene prompt from free-form text.
    pub fn set_scene_prompt(&self, id: SceneId, text: &str) -> EngineResult<ScenePrompt> {
        let prompt = ScenePrompt::parse(text);
        self.scenes.update(|board| board.set_prompt(id, prompt.clone()))?;
        self.events.emit(StudioEvent::SceneUpdated { id });
        Ok(prompt)
    }

    pub async fn generate_scene_prompt(&self, id: SceneId, inputs: &GenerationInputs) -> EngineResult<ScenePrompt> {
        self.story.generate_scene_prompt(id, inputs).await
    }

    pub async fn generate_scene_video(
        &self,
        id: SceneId,
        inputs: &GenerationInputs,
        cancel: &CancelToken,
    ) -> EngineResult<VideoHandle> {
        self.story.generate_scene_video(id, inputs, cancel).await
    }

    pub async fn run_story(&self, inputs: &GenerationInputs) -> EngineResult<StoryReport> {
        self.story.run(inputs).await
    }
}
