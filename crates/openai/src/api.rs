//! HTTP client for the OpenAI endpoints.
//!
//! One attempt per call; callers decide what a failure means.

use std::time::Duration;

use panelsmith_core::model::{ImageData, ImageQuality, PromptPart, SceneInfo};

use crate::messages::{
    first_image, multimodal_image_body, parse_scene_info, scene_analysis_body, text_image_body,
    ChatCompletionResponse, ResponsesResponse, SceneParseError,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for both analysis and image generation.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Image generation routinely takes a minute or more.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Errors from the OpenAI client.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// The client is missing required configuration (e.g. the API key).
    #[error("OpenAI client misconfigured: {0}")]
    Configuration(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("OpenAI API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// Scene analysis returned content that does not fit the schema.
    #[error("Scene analysis response unusable: {0}")]
    InvalidScene(#[from] SceneParseError),

    /// The response contained no image-generation output.
    #[error("No image generated")]
    NoImage,
}

/// Client for a single OpenAI-compatible endpoint.
pub struct OpenAiApi {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiApi {
    pub fn new(config: OpenAiConfig) -> Result<Self, OpenAiError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Extract characters, scene description, mood and setting from panel
    /// text.
    pub async fn analyze_scene(&self, content: &str) -> Result<SceneInfo, OpenAiError> {
        tracing::debug!(content_len = content.len(), "Requesting scene analysis");
        let body = scene_analysis_body(&self.config.model, content);
        let response: ChatCompletionResponse = self.post_json("chat/completions", &body).await?;
        let scene = parse_scene_info(&response)?;
        tracing::info!(
            detected = ?scene.detected_names(),
            mood = %scene.mood,
            setting = %scene.setting,
            "Scene analysed",
        );
        Ok(scene)
    }

    /// Generate an image from ordered multimodal prompt parts.
    pub async fn generate_image(
        &self,
        parts: &[PromptPart],
        quality: ImageQuality,
    ) -> Result<ImageData, OpenAiError> {
        let images = parts
            .iter()
            .filter(|p| matches!(p, PromptPart::Image(_)))
            .count();
        tracing::info!(
            parts = parts.len(),
            images,
            quality = quality.as_str(),
            "Requesting panel image",
        );
        let body = multimodal_image_body(&self.config.model, parts, quality);
        self.request_image(&body).await
    }

    /// Generate an image from a plain text prompt.
    pub async fn generate_image_from_prompt(
        &self,
        prompt: &str,
        quality: ImageQuality,
    ) -> Result<ImageData, OpenAiError> {
        tracing::info!(prompt_len = prompt.len(), quality = quality.as_str(), "Requesting image");
        let body = text_image_body(&self.config.model, prompt, quality);
        self.request_image(&body).await
    }

    // ---- private helpers ----

    async fn request_image(&self, body: &serde_json::Value) -> Result<ImageData, OpenAiError> {
        let response: ResponsesResponse = self.post_json("responses", body).await?;
        let kinds: Vec<&str> = response.output.iter().map(|o| o.kind.as_str()).collect();
        let image = first_image(&response).ok_or_else(|| {
            tracing::warn!(output_types = ?kinds, "Response contained no image");
            OpenAiError::NoImage
        })?;
        tracing::info!(image_bytes = image.len(), "Image generated");
        Ok(image)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpenAiError> {
        if self.config.api_key.trim().is_empty() {
            return Err(OpenAiError::Configuration(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }
        let url = format!("{}/{path}", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code, returning the body
    /// text inside [`OpenAiError::ApiError`] otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OpenAiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OpenAiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, OpenAiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
