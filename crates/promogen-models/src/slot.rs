//! Content slots: one generated image per (category, index) plus everything
//! derived from it.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Category, ImageData, VideoHandle};

/// Composite key identifying a slot.
///
/// Ordering follows the catalog: category first, then index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct SlotKey {
    pub category: Category,
    pub index: usize,
}

impl SlotKey {
    pub const fn new(category: Category, index: usize) -> Self {
        Self { category, index }
    }

    /// Every key in the template catalog, in processing order.
    pub fn catalog() -> impl Iterator<Item = SlotKey> {
        Category::ALL.iter().flat_map(|category| {
            (0..category.templates().len()).map(move |index| SlotKey::new(*category, index))
        })
    }

    /// Whether the catalog has a template for this key.
    pub fn exists(&self) -> bool {
        self.category.template(self.index).is_some()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.category, self.index)
    }
}

/// Generated image for one slot and the artifacts derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentSlot {
    /// Generated image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,

    /// Short video scenario written from the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    /// Cinematic text-to-image description of the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cinematic: Option<String>,

    /// Edited variants keyed by transformation label
    #[serde(default)]
    pub variants: BTreeMap<String, ImageData>,

    /// Video rendered from the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoHandle>,
}

impl ContentSlot {
    /// Store a freshly generated image without touching derived fields.
    pub fn record_image(&mut self, image: ImageData) {
        self.image = Some(image);
    }

    /// Replace the image and drop everything that was derived from the old one.
    pub fn replace_image(&mut self, image: ImageData) {
        self.image = Some(image);
        self.invalidate_derived();
    }

    /// Clear scenario, cinematic text, variants and video.
    pub fn invalidate_derived(&mut self) {
        self.scenario = None;
        self.cinematic = None;
        self.variants.clear();
        self.video = None;
    }

    /// Add (or overwrite) the variant for a transformation label.
    /// Variants for other labels are kept.
    pub fn add_variant(&mut self, label: impl Into<String>, image: ImageData) {
        self.variants.insert(label.into(), image);
    }

    pub fn set_scenario(&mut self, text: impl Into<String>) {
        self.scenario = Some(text.into());
    }

    pub fn set_cinematic(&mut self, text: impl Into<String>) {
        self.cinematic = Some(text.into());
    }

    pub fn set_video(&mut self, video: VideoHandle) {
        self.video = Some(video);
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// True when nothing has been generated for this slot.
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.scenario.is_none()
            && self.cinematic.is_none()
            && self.variants.is_empty()
            && self.video.is_none()
    }
}

/// All content slots, keyed by [`SlotKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct SlotBoard {
    slots: BTreeMap<SlotKey, ContentSlot>,
}

impl SlotBoard {
    /// Board with an empty slot for every catalog entry.
    pub fn new() -> Self {
        Self {
            slots: SlotKey::catalog()
                .map(|key| (key, ContentSlot::default()))
                .collect(),
        }
    }

    /// Reset every slot to empty.
    pub fn reset(&mut self) {
        for slot in self.slots.values_mut() {
            *slot = ContentSlot::default();
        }
    }

    pub fn get(&self, key: &SlotKey) -> Option<&ContentSlot> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: &SlotKey) -> Option<&mut ContentSlot> {
        self.slots.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &ContentSlot)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding an image.
    pub fn filled(&self) -> usize {
        self.slots.values().filter(|slot| slot.has_image()).count()
    }
}

impl Default for SlotBoard {
    fn default() -> Self {
        Self::new()
    }
}
