//! Standalone generation routes (no project context).

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// POST   /generate-panel       -> generate_panel
/// POST   /generate-panel-v2    -> generate_panel_v2
/// POST   /generate-character   -> generate_character
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-panel", post(generation::generate_panel))
        .route("/generate-panel-v2", post(generation::generate_panel_v2))
        .route("/generate-character", post(generation::generate_character))
}
