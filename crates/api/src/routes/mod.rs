pub mod generation;
pub mod health;
pub mod project;
pub mod reference_job;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                                  list, create
/// /projects/{id}                                             get, update, delete
/// /projects/{id}/pages                                       append page (POST)
/// /projects/{id}/pages/{page_id}/layout                      resize / reorient (PUT)
/// /projects/{id}/pages/{page_id}/panels/{panel_id}           edit content (PUT)
/// /projects/{id}/pages/{page_id}/generate                    full sequence run (POST)
/// /projects/{id}/characters                                  create (POST)
/// /projects/{id}/characters/{character_id}                   update, delete
/// /projects/{id}/characters/{character_id}/template          fill image prompt (POST)
/// /projects/{id}/characters/{character_id}/reference-jobs    start job (POST)
/// /projects/{id}/characters/{character_id}/reference-jobs/{job_id}/apply
///                                                            keep job image (POST)
///
/// /generate-panel                                            windowed panel (POST)
/// /generate-panel-v2                                         single-prior panel (POST)
/// /generate-character                                        character image (POST)
///
/// /reference-jobs/active                                     stop polling (DELETE)
/// /reference-jobs/{job_id}                                   job status (GET)
/// /reference-jobs/{job_id}/upscale                           upscale candidate (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/reference-jobs", reference_job::router())
        .merge(generation::router())
}
