//! Panel image synthesis.

use std::sync::Arc;

use async_trait::async_trait;
use panelsmith_core::model::{CharacterReference, ImageData, ImageQuality, PriorPanel, PromptPart};
use panelsmith_openai::OpenAiApi;

use crate::prompt::build_panel_prompt;
use crate::PipelineError;

/// Image-generation seam.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image from ordered multimodal parts.
    async fn generate(
        &self,
        parts: &[PromptPart],
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError>;

    /// Generate one image from a plain text prompt.
    async fn generate_from_prompt(
        &self,
        prompt: &str,
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError>;
}

#[async_trait]
impl ImageGenerator for OpenAiApi {
    async fn generate(
        &self,
        parts: &[PromptPart],
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError> {
        self.generate_image(parts, quality)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))
    }

    async fn generate_from_prompt(
        &self,
        prompt: &str,
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError> {
        self.generate_image_from_prompt(prompt, quality)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))
    }
}

/// Draws one panel from its scene text, resolved references and prior
/// panels at a fixed quality tier.
#[derive(Clone)]
pub struct PanelSynthesizer {
    generator: Arc<dyn ImageGenerator>,
    quality: ImageQuality,
}

impl PanelSynthesizer {
    pub fn new(generator: Arc<dyn ImageGenerator>, quality: ImageQuality) -> Self {
        Self { generator, quality }
    }

    pub async fn synthesize(
        &self,
        scene: &str,
        references: &[CharacterReference],
        prior: &[PriorPanel],
    ) -> Result<ImageData, PipelineError> {
        tracing::debug!(
            references = references.len(),
            prior_panels = prior.len(),
            quality = self.quality.as_str(),
            "Synthesizing panel",
        );
        let parts = build_panel_prompt(scene, references, prior);
        self.generator.generate(&parts, self.quality).await
    }
}
