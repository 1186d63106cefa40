//! Client for the remote generative-media service.
//!
//! The engine only talks to the service through the [`MediaService`] trait,
//! so every flow receives one injected handle. [`GeminiClient`] is the HTTP
//! implementation backed by the Gemini image, text and Veo video endpoints.

pub mod client;
pub mod error;
pub mod service;
pub mod types;
mod wire;

pub use client::{GeminiClient, GeminiConfig};
pub use error::{ClientError, ClientResult};
pub use service::MediaService;
pub use types::{
    ImageRequest, JobFailure, ResponseFormat, TextRequest, VideoJobHandle, VideoJobStatus,
    VideoOperation, VideoRequest,
};
