//! Client for the OpenAI-compatible text and image generation endpoints.
//!
//! Two capabilities are wrapped: structured scene analysis through chat
//! completions with a strict JSON schema, and image generation through the
//! responses API's `image_generation` tool.

pub mod api;
pub mod messages;

pub use api::{OpenAiApi, OpenAiConfig, OpenAiError};
