//! Route definitions for the `/projects` resource.
//!
//! Pages, characters and character reference jobs are nested under
//! `/projects/{project_id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{character, page, project, reference_job};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                                        -> list
/// POST   /                                                        -> create
/// GET    /{id}                                                    -> get_by_id
/// PUT    /{id}                                                    -> update
/// DELETE /{id}                                                    -> delete
///
/// POST   /{project_id}/pages                                      -> add_page
/// PUT    /{project_id}/pages/{page_id}/layout                     -> update_layout
/// PUT    /{project_id}/pages/{page_id}/panels/{panel_id}          -> update_panel
/// POST   /{project_id}/pages/{page_id}/generate                   -> generate_page
///
/// POST   /{project_id}/characters                                 -> create
/// PUT    /{project_id}/characters/{id}                            -> update
/// DELETE /{project_id}/characters/{id}                            -> delete
/// POST   /{project_id}/characters/{id}/template                   -> apply_template
/// POST   /{project_id}/characters/{id}/reference-jobs             -> start
/// POST   /{project_id}/characters/{id}/reference-jobs/{job_id}/apply -> apply
/// ```
pub fn router() -> Router<AppState> {
    let page_routes = Router::new()
        .route("/", post(page::add_page))
        .route("/{page_id}/layout", put(page::update_layout))
        .route("/{page_id}/panels/{panel_id}", put(page::update_panel))
        .route("/{page_id}/generate", post(page::generate_page));

    let character_routes = Router::new()
        .route("/", post(character::create))
        .route("/{id}", put(character::update).delete(character::delete))
        .route("/{id}/template", post(character::apply_template))
        .route("/{id}/reference-jobs", post(reference_job::start))
        .route(
            "/{id}/reference-jobs/{job_id}/apply",
            post(reference_job::apply),
        );

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/pages", page_routes)
        .nest("/{project_id}/characters", character_routes)
}
