//! Single-panel generation: analyze, resolve, synthesize.

use std::sync::Arc;

use panelsmith_core::model::{Character, ImageData, PriorPanel, SceneInfo};
use panelsmith_core::reference::{matched_characters, resolve_references};
use panelsmith_core::validation::validate_panel_content;
use serde::Serialize;

use crate::analyzer::SceneAnalyzer;
use crate::synthesizer::PanelSynthesizer;
use crate::PipelineError;

/// Result of generating one panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOutcome {
    pub image: ImageData,
    /// Names the analyzer found in the scene text.
    pub detected_characters: Vec<String>,
    /// Roster names that matched a detected name, with or without a
    /// reference image.
    pub matched_characters: Vec<String>,
    pub scene_info: SceneInfo,
}

#[derive(Clone)]
pub struct PanelPipeline {
    analyzer: Arc<dyn SceneAnalyzer>,
    synthesizer: PanelSynthesizer,
}

impl PanelPipeline {
    pub fn new(analyzer: Arc<dyn SceneAnalyzer>, synthesizer: PanelSynthesizer) -> Self {
        Self {
            analyzer,
            synthesizer,
        }
    }

    /// Generate one panel conditioned on `prior` (oldest first).
    ///
    /// Blank content is rejected before any upstream call.
    pub async fn generate(
        &self,
        content: &str,
        roster: &[Character],
        prior: &[PriorPanel],
    ) -> Result<PanelOutcome, PipelineError> {
        validate_panel_content(content)?;
        self.generate_validated(content, roster, prior).await
    }

    /// Same as [`generate`](Self::generate) for content already validated.
    pub(crate) async fn generate_validated(
        &self,
        content: &str,
        roster: &[Character],
        prior: &[PriorPanel],
    ) -> Result<PanelOutcome, PipelineError> {
        let scene_info = self.analyzer.analyze(content).await?;
        let detected = scene_info.detected_names();

        let matched: Vec<String> = matched_characters(&detected, roster)
            .into_iter()
            .map(|c| c.name.clone())
            .collect();
        let references = resolve_references(&detected, roster);
        tracing::info!(
            detected = ?detected,
            matched = ?matched,
            references = references.len(),
            prior_panels = prior.len(),
            "Resolved character references",
        );

        let image = self
            .synthesizer
            .synthesize(content, &references, prior)
            .await?;

        Ok(PanelOutcome {
            image,
            detected_characters: detected,
            matched_characters: matched,
            scene_info,
        })
    }
}
