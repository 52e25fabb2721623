//! Standalone generation handlers.
//!
//! These take everything they need in the request body (roster, prior
//! panels) and persist nothing.

use axum::extract::State;
use axum::Json;
use panelsmith_core::context::{ContextWindow, SEQUENCE_WINDOW_CAPACITY, SINGLE_PRIOR_CAPACITY};
use panelsmith_core::model::{Character, ImageData, PriorPanel, SceneInfo};
use panelsmith_core::validation::require_non_empty;
use panelsmith_pipeline::PanelOutcome;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePanelRequest {
    pub content: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Oldest first; only the most recent entries are used.
    #[serde(default)]
    pub previous_panels: Vec<PriorPanel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePanelV2Request {
    pub content: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    pub previous_panel_image: Option<ImageData>,
    pub previous_panel_scene: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePanelResponse {
    pub image_url: ImageData,
    pub detected_characters: Vec<String>,
    pub matched_characters: Vec<String>,
    pub scene_info: SceneInfo,
}

impl From<PanelOutcome> for GeneratePanelResponse {
    fn from(outcome: PanelOutcome) -> Self {
        Self {
            image_url: outcome.image,
            detected_characters: outcome.detected_characters,
            matched_characters: outcome.matched_characters,
            scene_info: outcome.scene_info,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateCharacterRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCharacterResponse {
    pub image_url: ImageData,
}

/// POST /api/v1/generate-panel
pub async fn generate_panel(
    State(state): State<AppState>,
    Json(input): Json<GeneratePanelRequest>,
) -> AppResult<Json<GeneratePanelResponse>> {
    let prior = ContextWindow::from_prior(input.previous_panels, SEQUENCE_WINDOW_CAPACITY).to_vec();

    let outcome = state
        .panels
        .generate(&input.content, &input.characters, &prior)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/generate-panel-v2
///
/// Conditions on at most one prior panel, and only when both its image
/// and its scene text are supplied.
pub async fn generate_panel_v2(
    State(state): State<AppState>,
    Json(input): Json<GeneratePanelV2Request>,
) -> AppResult<Json<GeneratePanelResponse>> {
    let prior = match (input.previous_panel_image, input.previous_panel_scene) {
        (Some(image), Some(scene)) if !image.is_empty() && !scene.trim().is_empty() => {
            vec![PriorPanel { scene, image }]
        }
        _ => Vec::new(),
    };
    let prior = ContextWindow::from_prior(prior, SINGLE_PRIOR_CAPACITY).to_vec();

    let outcome = state
        .panels
        .generate(&input.content, &input.characters, &prior)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/generate-character
pub async fn generate_character(
    State(state): State<AppState>,
    Json(input): Json<GenerateCharacterRequest>,
) -> AppResult<Json<GenerateCharacterResponse>> {
    require_non_empty("Prompt", &input.prompt)?;

    tracing::info!(
        prompt_len = input.prompt.len(),
        quality = state.config.character_quality.as_str(),
        "Generating character image",
    );
    let image_url = state
        .images
        .generate_from_prompt(&input.prompt, state.config.character_quality)
        .await?;
    Ok(Json(GenerateCharacterResponse { image_url }))
}
