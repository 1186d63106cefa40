//! Generation orchestration engine.
//!
//! This crate provides:
//! - Prompt builders for images, edits, scenarios and story beats
//! - A retrying text-generation wrapper
//! - The batch sequencer and single-slot edit/regenerate operations
//! - An async video job poller with a wait budget and cancellation
//! - The four-beat story pipeline
//! - The `Studio` facade tying them to shared state and progress events

pub mod batch;
pub mod cancel;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod retry;
pub mod state;
pub mod story;
pub mod studio;
pub mod text;
pub mod video;

#[cfg(test)]
mod testing;

pub use batch::{plan_tasks, BatchReport, BatchSequencer, GenerationTask};
pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use editor::SlotEditor;
pub use error::{classify_remote_error, EngineError, EngineResult};
pub use logging::RunLogger;
pub use retry::{retry_async, Backoff, RetryPolicy, RetryResult};
pub use story::{parse_story_plan, StoryBeat, StoryPipeline, StoryReport};
pub use studio::Studio;
pub use text::TextGenerator;
pub use video::VideoPoller;
