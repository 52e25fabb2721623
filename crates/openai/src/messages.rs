//! Request bodies and response types for the OpenAI endpoints.
//!
//! Request bodies are assembled as JSON values; responses are parsed into
//! the minimal typed shape this crate reads.

use panelsmith_core::model::{ImageData, ImageQuality, PromptPart, SceneInfo};
use serde::Deserialize;
use serde_json::{json, Value};

/// Output resolution requested for every generated image.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Output item type carrying a generated image.
pub const IMAGE_GENERATION_CALL: &str = "image_generation_call";

const SCENE_SYSTEM_PROMPT: &str = "You are a comic book expert. Analyze the given scene content and extract character information, scene details, and mood.";

// ---------------------------------------------------------------------------
// Scene analysis
// ---------------------------------------------------------------------------

/// Strict schema the analysis response must satisfy.
pub fn scene_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "characters": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "role": { "type": "string" }
                    },
                    "required": ["name", "description", "role"],
                    "additionalProperties": false
                }
            },
            "scene_description": { "type": "string" },
            "mood": { "type": "string" },
            "setting": { "type": "string" }
        },
        "required": ["characters", "scene_description", "mood", "setting"],
        "additionalProperties": false
    })
}

/// Chat-completions body for analysing one panel's scene text.
pub fn scene_analysis_body(model: &str, content: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SCENE_SYSTEM_PROMPT },
            {
                "role": "user",
                "content": format!(
                    "Analyze this comic panel content and extract character information: \"{content}\""
                )
            }
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "character_detection",
                "strict": true,
                "schema": scene_analysis_schema()
            }
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

/// Why a chat completion could not be read as a [`SceneInfo`].
#[derive(Debug, thiserror::Error)]
pub enum SceneParseError {
    #[error("response contained no message content")]
    MissingContent,

    #[error("model refused: {0}")]
    Refused(String),

    #[error("content does not match the scene schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Parse the first choice's content against the scene schema.
pub fn parse_scene_info(response: &ChatCompletionResponse) -> Result<SceneInfo, SceneParseError> {
    let message = &response
        .choices
        .first()
        .ok_or(SceneParseError::MissingContent)?
        .message;
    if let Some(refusal) = message.refusal.as_deref().filter(|r| !r.is_empty()) {
        return Err(SceneParseError::Refused(refusal.to_string()));
    }
    let content = message
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or(SceneParseError::MissingContent)?;
    Ok(serde_json::from_str(content)?)
}

// ---------------------------------------------------------------------------
// Image generation
// ---------------------------------------------------------------------------

/// Map prompt parts to responses-API input content, preserving order.
pub fn input_content(parts: &[PromptPart]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| match part {
            PromptPart::Text(text) => json!({ "type": "input_text", "text": text }),
            PromptPart::Image(image) => json!({
                "type": "input_image",
                "image_url": image.to_data_url()
            }),
        })
        .collect()
}

fn image_tool(quality: ImageQuality) -> Value {
    json!([{
        "type": "image_generation",
        "quality": quality.as_str(),
        "size": IMAGE_SIZE
    }])
}

/// Responses body with a single multimodal user message.
pub fn multimodal_image_body(model: &str, parts: &[PromptPart], quality: ImageQuality) -> Value {
    json!({
        "model": model,
        "input": [{ "role": "user", "content": input_content(parts) }],
        "tools": image_tool(quality)
    })
}

/// Responses body for a plain text prompt.
pub fn text_image_body(model: &str, prompt: &str, quality: ImageQuality) -> Value {
    json!({
        "model": model,
        "input": prompt,
        "tools": image_tool(quality)
    })
}

#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub result: Option<String>,
}

/// The first image-generation result in the response, if any.
pub fn first_image(response: &ResponsesResponse) -> Option<ImageData> {
    response
        .output
        .iter()
        .filter(|item| item.kind == IMAGE_GENERATION_CALL)
        .find_map(|item| item.result.as_deref().filter(|r| !r.is_empty()))
        .map(ImageData::new)
}
