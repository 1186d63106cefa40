//! Progress events published while flows run.
//!
//! Subscribers use these to reveal results progressively instead of waiting
//! for a whole batch or story to finish.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{SceneId, SceneRole, SlotKey};

/// Studio progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    /// A slot changed (image, variant, text or video)
    SlotUpdated { key: SlotKey },

    /// A slot generation failed inside a batch
    SlotFailed { key: SlotKey, message: String },

    /// A batch run finished
    BatchCompleted {
        succeeded: usize,
        failed: usize,
        finished_at: DateTime<Utc>,
    },

    /// A scene changed in place
    SceneUpdated { id: SceneId },

    /// The story pipeline appended a scene
    SceneAppended {
        id: SceneId,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<SceneRole>,
    },

    /// The story pipeline produced every beat
    StoryCompleted { scenes: usize },

    /// A video job was polled and is still running
    VideoPolled { job: String, attempt: u32 },
}

impl StudioEvent {
    pub fn batch_completed(succeeded: usize, failed: usize) -> Self {
        StudioEvent::BatchCompleted {
            succeeded,
            failed,
            finished_at: Utc::now(),
        }
    }

    pub fn slot_failed(key: SlotKey, message: impl Into<String>) -> Self {
        StudioEvent::SlotFailed {
            key,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = StudioEvent::SlotUpdated {
            key: SlotKey::new(Category::Ugc, 1),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "slot_updated");
        assert_eq!(json["key"]["category"], "UGC");
        assert_eq!(json["key"]["index"], 1);
    }
}
