use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::reference_job;
use crate::state::AppState;

/// Routes mounted at `/reference-jobs`.
///
/// ```text
/// DELETE /active               -> stop_active
/// GET    /{job_id}             -> get_status
/// POST   /{job_id}/upscale     -> upscale
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/active", delete(reference_job::stop_active))
        .route("/{job_id}", get(reference_job::get_status))
        .route("/{job_id}/upscale", post(reference_job::upscale))
}
