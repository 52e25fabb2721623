//! Handlers for character reference images produced by the job service.
//!
//! A job is started for a character, polled in the background by the
//! [`JobController`](panelsmith_jobs::JobController), optionally upscaled,
//! and finally applied to the character as its reference image.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use panelsmith_core::error::CoreError;
use panelsmith_core::model::Character;
use panelsmith_core::validation::validate_upscale_index;
use panelsmith_jobs::{JobError, JobRecord};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::character::{character_mut, save_character};
use crate::handlers::project::load_project;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StartJob {
    /// Overrides the character's stored image prompt.
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    pub job_id: String,
    pub character_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpscaleJob {
    pub index: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleResponse {
    pub job_id: String,
    pub index: u8,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    /// Job id whose polling was cancelled, if one was active.
    pub stopped: Option<String>,
}

/// POST /api/v1/projects/{project_id}/characters/{id}/reference-jobs
///
/// Submits a generate job and starts polling it, replacing any poll
/// already running.
pub async fn start(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(String, String)>,
    input: Option<Json<StartJob>>,
) -> AppResult<(StatusCode, Json<StartJobResponse>)> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let mut project = load_project(&state, &project_id).await?;
    let character = character_mut(&mut project, &id)?;
    let prompt = input
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| character.image_prompt.clone());
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Please provide an image prompt for the character".to_string(),
        )
        .into());
    }

    let job_id = state.jobs.start_generation(&prompt).await?;
    character.image_id = Some(job_id.clone());
    save_character(&state, project, &id).await?;

    tracing::info!(project_id = %project_id, character_id = %id, job_id = %job_id, "Reference job started");
    Ok((
        StatusCode::ACCEPTED,
        Json(StartJobResponse {
            job_id,
            character_id: id,
        }),
    ))
}

/// GET /api/v1/reference-jobs/{job_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobRecord>> {
    let record = state
        .jobs
        .record(&job_id)
        .await
        .ok_or_else(|| JobError::UnknownJob(job_id.clone()))?;
    Ok(Json(record))
}

/// POST /api/v1/reference-jobs/{job_id}/upscale
pub async fn upscale(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(input): Json<UpscaleJob>,
) -> AppResult<(StatusCode, Json<UpscaleResponse>)> {
    validate_upscale_index(input.index)?;
    state.jobs.upscale(&job_id, input.index).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UpscaleResponse {
            job_id,
            index: input.index,
        }),
    ))
}

/// DELETE /api/v1/reference-jobs/active
pub async fn stop_active(State(state): State<AppState>) -> Json<StopResponse> {
    Json(StopResponse {
        stopped: state.jobs.stop_polling().await,
    })
}

/// POST /api/v1/projects/{project_id}/characters/{id}/reference-jobs/{job_id}/apply
///
/// Downloads the job's best image (upscaled if available) and stores it
/// as the character's reference.
pub async fn apply(
    State(state): State<AppState>,
    Path((project_id, id, job_id)): Path<(String, String, String)>,
) -> AppResult<Json<Character>> {
    // Fail on a missing character before downloading anything.
    let mut project = load_project(&state, &project_id).await?;
    character_mut(&mut project, &id)?;

    let (image, kind) = state.jobs.fetch_reference(&job_id).await?;

    let mut project = load_project(&state, &project_id).await?;
    let character = character_mut(&mut project, &id)?;
    character.set_reference(image, kind);
    character.image_id = Some(job_id.clone());

    let character = save_character(&state, project, &id).await?;
    tracing::info!(
        project_id = %project_id,
        character_id = %id,
        job_id = %job_id,
        kind = kind.as_str(),
        "Reference image applied",
    );
    Ok(Json(character))
}
