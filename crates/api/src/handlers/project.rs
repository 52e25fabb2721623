//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use panelsmith_core::error::CoreError;
use panelsmith_core::model::{Comic, Project};
use panelsmith_core::validation::validate_project_name;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
}

/// Partial update. `comic` replaces the whole comic document.
#[derive(Debug, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub comic: Option<Comic>,
}

/// Load a project or fail with 404.
pub(crate) async fn load_project(state: &AppState, id: &str) -> AppResult<Project> {
    state
        .store
        .find_by_id(id)
        .await
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: id.to_string(),
            })
        })
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.list().await)
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_project_name(&input.name)?;
    let project = state.store.create(input.name.trim()).await?;
    tracing::info!(project_id = %project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Project>> {
    Ok(Json(load_project(&state, &id).await?))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    let mut project = load_project(&state, &id).await?;

    if let Some(name) = input.name {
        validate_project_name(&name)?;
        project.name = name.trim().to_string();
    }
    if let Some(mut comic) = input.comic {
        comic.updated_at = chrono::Utc::now();
        project.comic = comic;
    }

    Ok(Json(state.store.save(project).await?))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.store.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}
