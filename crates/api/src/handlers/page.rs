//! Handlers for pages and panels.
//!
//! Pages are nested under projects:
//! `/projects/{project_id}/pages/{page_id}[/...]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use panelsmith_core::error::CoreError;
use panelsmith_core::layout::{
    grid_layout, resize_panels, spans_two_columns, validate_panel_count, GridLayout,
    DEFAULT_PANEL_COUNT,
};
use panelsmith_core::model::{Orientation, Page, Project};
use panelsmith_pipeline::apply_outcomes;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::project::load_project;
use crate::state::AppState;

/// A page plus the grid shape the UI should draw it in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    #[serde(flatten)]
    pub page: Page,
    pub grid: GridLayout,
    /// Panel stretched across two columns, if the count is odd.
    pub wide_panel_id: Option<String>,
}

impl PageView {
    pub fn new(page: Page) -> Self {
        let grid = grid_layout(page.panel_count, page.orientation);
        let wide_panel_id = page
            .panels
            .iter()
            .enumerate()
            .find(|(index, _)| spans_two_columns(page.panel_count, *index))
            .map(|(_, panel)| panel.id.clone());
        Self {
            page,
            grid,
            wide_panel_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPage {
    pub panel_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLayout {
    pub panel_count: usize,
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePanel {
    pub content: String,
}

/// Per-panel report from a sequence run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPanelSummary {
    pub panel_id: String,
    pub detected_characters: Vec<String>,
    pub matched_characters: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePageResponse {
    pub page: PageView,
    pub panels: Vec<GeneratedPanelSummary>,
}

fn page_not_found(page_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Page",
        id: page_id.to_string(),
    })
}

fn page_mut<'a>(project: &'a mut Project, page_id: &str) -> AppResult<&'a mut Page> {
    project
        .comic
        .page_mut(page_id)
        .ok_or_else(|| page_not_found(page_id))
}

/// Persist `project` after a comic edit and return the edited page.
async fn save_page(state: &AppState, mut project: Project, page_id: &str) -> AppResult<PageView> {
    project.comic.updated_at = chrono::Utc::now();
    let project = state.store.save(project).await?;
    let page = project
        .comic
        .page(page_id)
        .cloned()
        .ok_or_else(|| page_not_found(page_id))?;
    Ok(PageView::new(page))
}

/// POST /api/v1/projects/{project_id}/pages
pub async fn add_page(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    input: Option<Json<AddPage>>,
) -> AppResult<(StatusCode, Json<PageView>)> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let panel_count = input.panel_count.unwrap_or(DEFAULT_PANEL_COUNT);
    validate_panel_count(panel_count)?;

    let mut project = load_project(&state, &project_id).await?;
    let page = Page::new(project.comic.next_page_number(), panel_count);
    let page_id = page.id.clone();
    project.comic.pages.push(page);

    let view = save_page(&state, project, &page_id).await?;
    tracing::info!(project_id = %project_id, page_id = %page_id, panel_count, "Page added");
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/v1/projects/{project_id}/pages/{page_id}/layout
///
/// Resizing keeps panels at surviving indices untouched.
pub async fn update_layout(
    State(state): State<AppState>,
    Path((project_id, page_id)): Path<(String, String)>,
    Json(input): Json<UpdateLayout>,
) -> AppResult<Json<PageView>> {
    validate_panel_count(input.panel_count)?;

    let mut project = load_project(&state, &project_id).await?;
    let page = page_mut(&mut project, &page_id)?;
    resize_panels(page, input.panel_count);
    if let Some(orientation) = input.orientation {
        page.orientation = orientation;
    }

    Ok(Json(save_page(&state, project, &page_id).await?))
}

/// PUT /api/v1/projects/{project_id}/pages/{page_id}/panels/{panel_id}
pub async fn update_panel(
    State(state): State<AppState>,
    Path((project_id, page_id, panel_id)): Path<(String, String, String)>,
    Json(input): Json<UpdatePanel>,
) -> AppResult<Json<PageView>> {
    let mut project = load_project(&state, &project_id).await?;
    let panel = page_mut(&mut project, &page_id)?
        .panel_mut(&panel_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Panel",
                id: panel_id.clone(),
            })
        })?;
    panel.content = input.content;

    Ok(Json(save_page(&state, project, &page_id).await?))
}

/// POST /api/v1/projects/{project_id}/pages/{page_id}/generate
///
/// Generates every panel of the page in order. Images are committed only
/// when the whole run succeeds; one run per project at a time.
pub async fn generate_page(
    State(state): State<AppState>,
    Path((project_id, page_id)): Path<(String, String)>,
) -> AppResult<Json<GeneratePageResponse>> {
    let project = load_project(&state, &project_id).await?;
    let page = project
        .comic
        .page(&page_id)
        .cloned()
        .ok_or_else(|| page_not_found(&page_id))?;

    let _guard = state.in_flight.try_acquire(&project_id).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "A generation run is already in progress for this project".to_string(),
        ))
    })?;

    tracing::info!(
        project_id = %project_id,
        page_id = %page_id,
        panels = page.panels.len(),
        "Starting sequence run",
    );
    let generated = state
        .sequences
        .run(&page.panels, &project.comic.characters)
        .await?;

    // Re-read so edits made during the run are not clobbered.
    let mut project = load_project(&state, &project_id).await?;
    let applied = apply_outcomes(page_mut(&mut project, &page_id)?, &generated);
    let view = save_page(&state, project, &page_id).await?;
    tracing::info!(project_id = %project_id, page_id = %page_id, applied, "Sequence run committed");

    let panels = generated
        .into_iter()
        .map(|g| GeneratedPanelSummary {
            panel_id: g.panel_id,
            detected_characters: g.outcome.detected_characters,
            matched_characters: g.outcome.matched_characters,
        })
        .collect();

    Ok(Json(GeneratePageResponse { page: view, panels }))
}
