//! Story scenes.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ImageData, ScenePrompt, VideoHandle};

/// Maximum number of scenes on the board.
pub const MAX_SCENES: usize = 4;

/// Locally unique scene identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SceneId(pub u64);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene-{}", self.0)
    }
}

/// Narrative role of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SceneRole {
    Hook,
    Problem,
    Solution,
    Cta,
    /// Manually added scene without a story role
    Scene,
}

impl SceneRole {
    /// Story beats in pipeline order.
    pub const STORY: [SceneRole; 4] = [
        SceneRole::Hook,
        SceneRole::Problem,
        SceneRole::Solution,
        SceneRole::Cta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneRole::Hook => "HOOK",
            SceneRole::Problem => "PROBLEM",
            SceneRole::Solution => "SOLUTION",
            SceneRole::Cta => "CTA",
            SceneRole::Scene => "SCENE",
        }
    }
}

impl fmt::Display for SceneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SceneRole {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOOK" => Ok(SceneRole::Hook),
            "PROBLEM" => Ok(SceneRole::Problem),
            "SOLUTION" => Ok(SceneRole::Solution),
            "CTA" => Ok(SceneRole::Cta),
            "SCENE" => Ok(SceneRole::Scene),
            _ => Err(SceneError::UnknownRole(s.to_string())),
        }
    }
}

/// One scene of the story board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneRecord {
    pub id: SceneId,

    /// Reference image for the scene
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,

    pub prompt: ScenePrompt,

    /// Rendered video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoHandle>,

    /// A prompt-generation call is in flight
    #[serde(default)]
    pub loading_prompt: bool,

    /// A video job is in flight
    #[serde(default)]
    pub loading_video: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<SceneRole>,
}

impl SceneRecord {
    pub fn new(id: SceneId, role: Option<SceneRole>) -> Self {
        Self {
            id,
            image: None,
            prompt: ScenePrompt::default(),
            video: None,
            loading_prompt: false,
            loading_video: false,
            role,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Scene board is full (max {0} scenes)")]
    Full(usize),

    #[error("Scene not found: {0}")]
    NotFound(SceneId),

    #[error("Unknown scene role: {0}")]
    UnknownRole(String),
}

/// Ordered collection of at most [`MAX_SCENES`] scenes.
///
/// The first scene is the identity anchor for the story pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBoard {
    scenes: Vec<SceneRecord>,
    next_id: u64,
}

impl SceneBoard {
    /// Board holding a single empty HOOK scene.
    pub fn new() -> Self {
        Self {
            scenes: vec![SceneRecord::new(SceneId(1), Some(SceneRole::Hook))],
            next_id: 2,
        }
    }

    fn allocate_id(&mut self) -> SceneId {
        let id = SceneId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append an empty scene.
    pub fn add_scene(&mut self) -> Result<SceneId, SceneError> {
        self.push(SceneRecord::new(SceneId(0), Some(SceneRole::Scene)))
    }

    /// Append a fully populated scene; the id is assigned by the board.
    pub fn push(&mut self, mut record: SceneRecord) -> Result<SceneId, SceneError> {
        if self.scenes.len() >= MAX_SCENES {
            return Err(SceneError::Full(MAX_SCENES));
        }
        record.id = self.allocate_id();
        let id = record.id;
        self.scenes.push(record);
        Ok(id)
    }

    /// Remove a scene. Removing the anchor makes the next scene the anchor.
    pub fn remove_scene(&mut self, id: SceneId) -> Result<SceneRecord, SceneError> {
        let position = self
            .scenes
            .iter()
            .position(|scene| scene.id == id)
            .ok_or(SceneError::NotFound(id))?;
        Ok(self.scenes.remove(position))
    }

    pub fn get(&self, id: SceneId) -> Option<&SceneRecord> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    pub fn get_mut(&mut self, id: SceneId) -> Result<&mut SceneRecord, SceneError> {
        self.scenes
            .iter_mut()
            .find(|scene| scene.id == id)
            .ok_or(SceneError::NotFound(id))
    }

    /// The anchor scene.
    pub fn first(&self) -> Option<&SceneRecord> {
        self.scenes.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut SceneRecord> {
        self.scenes.first_mut()
    }

    /// Replace a scene's image. Any video rendered from the old image is dropped.
    pub fn set_image(&mut self, id: SceneId, image: ImageData) -> Result<(), SceneError> {
        let scene = self.get_mut(id)?;
        scene.image = Some(image);
        scene.video = None;
        Ok(())
    }

    pub fn set_prompt(&mut self, id: SceneId, prompt: ScenePrompt) -> Result<(), SceneError> {
        self.get_mut(id)?.prompt = prompt;
        Ok(())
    }

    /// Drop every scene except the anchor.
    pub fn truncate_to_anchor(&mut self) {
        self.scenes.truncate(1);
    }

    pub fn scenes(&self) -> &[SceneRecord] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl Default for SceneBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_starts_with_hook_scene() {
        let board = SceneBoard::new();
        assert_eq!(board.len(), 1);
        assert_eq!(board.first().unwrap().role, Some(SceneRole::Hook));
    }

    #[test]
    fn test_board_caps_at_four_scenes() {
        let mut board = SceneBoard::new();
        for _ in 0..3 {
            board.add_scene().unwrap();
        }
        assert_eq!(board.add_scene(), Err(SceneError::Full(MAX_SCENES)));
        assert_eq!(board.len(), MAX_SCENES);
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut board = SceneBoard::new();
        let second = board.add_scene().unwrap();
        board.remove_scene(second).unwrap();
        let third = board.add_scene().unwrap();
        assert_ne!(second, third);
        assert_eq!(board.remove_scene(second), Err(SceneError::NotFound(second)));
    }

    #[test]
    fn test_removing_anchor_promotes_next_scene() {
        let mut board = SceneBoard::new();
        let anchor = board.first().unwrap().id;
        let second = board.add_scene().unwrap();

        board.remove_scene(anchor).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board.first().unwrap().id, second);

        board.truncate_to_anchor();
        assert_eq!(board.first().unwrap().id, second);
    }

    #[test]
    fn test_set_image_clears_video() {
        let mut board = SceneBoard::new();
        let id = board.first().unwrap().id;
        board.get_mut(id).unwrap().video =
            Some(VideoHandle::new("/tmp/a.mp4".into(), "https://x/a", 1));

        board.set_image(id, ImageData::jpeg(vec![1])).unwrap();
        let scene = board.get(id).unwrap();
        assert!(scene.image.is_some());
        assert!(scene.video.is_none());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("cta".parse::<SceneRole>().unwrap(), SceneRole::Cta);
        assert!("ending".parse::<SceneRole>().is_err());
    }
}
