//! Handlers for the comic's character roster.
//!
//! Characters are nested under projects:
//! `/projects/{project_id}/characters[/{id}]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use panelsmith_core::error::CoreError;
use panelsmith_core::model::{Character, ImageData, ImageKind, Project};
use panelsmith_core::template::character_prompt_template;
use panelsmith_core::validation::require_non_empty;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::project::load_project;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub image_prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub traits: Option<Vec<String>>,
    pub image_prompt: Option<String>,
    /// Replace the reference image directly (e.g. an upload).
    pub image_url: Option<ImageData>,
    #[serde(rename = "type")]
    pub kind: Option<ImageKind>,
}

pub(crate) fn character_mut<'a>(
    project: &'a mut Project,
    id: &str,
) -> AppResult<&'a mut Character> {
    project.comic.character_mut(id).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: id.to_string(),
        })
    })
}

/// Persist `project` and return the character as stored.
pub(crate) async fn save_character(
    state: &AppState,
    mut project: Project,
    id: &str,
) -> AppResult<Character> {
    project.comic.updated_at = chrono::Utc::now();
    let project = state.store.save(project).await?;
    project.comic.character(id).cloned().ok_or_else(|| {
        AppError::InternalError(format!("character {id} missing after save"))
    })
}

/// POST /api/v1/projects/{project_id}/characters
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(input): Json<CreateCharacter>,
) -> AppResult<(StatusCode, Json<Character>)> {
    require_non_empty("Character name", &input.name)?;

    let mut project = load_project(&state, &project_id).await?;
    let mut character = Character::new(input.name.trim(), input.description);
    character.traits = input.traits;
    character.image_prompt = input.image_prompt;
    let id = character.id.clone();
    project.comic.characters.push(character);

    let character = save_character(&state, project, &id).await?;
    tracing::info!(project_id = %project_id, character_id = %id, "Character created");
    Ok((StatusCode::CREATED, Json(character)))
}

/// PUT /api/v1/projects/{project_id}/characters/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(String, String)>,
    Json(input): Json<UpdateCharacter>,
) -> AppResult<Json<Character>> {
    if let Some(name) = &input.name {
        require_non_empty("Character name", name)?;
    }

    let mut project = load_project(&state, &project_id).await?;
    let character = character_mut(&mut project, &id)?;
    if let Some(name) = input.name {
        character.name = name.trim().to_string();
    }
    if let Some(description) = input.description {
        character.description = description;
    }
    if let Some(traits) = input.traits {
        character.traits = traits;
    }
    if let Some(image_prompt) = input.image_prompt {
        character.image_prompt = image_prompt;
    }
    if let Some(image) = input.image_url {
        character.set_reference(image, input.kind.unwrap_or(ImageKind::Generate));
    }

    Ok(Json(save_character(&state, project, &id).await?))
}

/// DELETE /api/v1/projects/{project_id}/characters/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let mut project = load_project(&state, &project_id).await?;
    let before = project.comic.characters.len();
    project.comic.characters.retain(|c| c.id != id);
    if project.comic.characters.len() == before {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id,
        }));
    }

    project.comic.updated_at = chrono::Utc::now();
    state.store.save(project).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{project_id}/characters/{id}/template
///
/// Fills the image prompt from the character's name and description.
pub async fn apply_template(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(String, String)>,
) -> AppResult<Json<Character>> {
    let mut project = load_project(&state, &project_id).await?;
    let character = character_mut(&mut project, &id)?;
    require_non_empty("Character name", &character.name)?;
    require_non_empty("Character description", &character.description)?;
    character.image_prompt = character_prompt_template(&character.name, &character.description);

    Ok(Json(save_character(&state, project, &id).await?))
}
