use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use panelsmith_core::error::CoreError;
use panelsmith_jobs::JobError;
use panelsmith_pipeline::PipelineError;
use panelsmith_store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the per-crate errors and implements [`IntoResponse`] to produce
/// consistent `{ "error", "code" }` JSON bodies. Upstream and internal
/// details are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `panelsmith_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Panel generation failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The reference job service or poller failed.
    #[error(transparent)]
    Jobs(#[from] JobError),

    /// Persisting projects failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn upstream(message: &str) -> (StatusCode, &'static str, String) {
    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Generation ---
            AppError::Pipeline(err) => match err {
                PipelineError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                PipelineError::Analysis(msg) => {
                    tracing::error!(error = %msg, "Scene analysis failed");
                    upstream("Failed to analyze panel content")
                }
                PipelineError::Generation(msg) => {
                    tracing::error!(error = %msg, "Image generation failed");
                    upstream("Failed to generate image")
                }
            },

            // --- Reference jobs ---
            AppError::Jobs(err) => match err {
                JobError::UnknownJob(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Reference job with id {id} not found"),
                ),
                JobError::NotReady(id) => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Reference job {id} has no images yet"),
                ),
                JobError::Submission(msg) => {
                    tracing::error!(error = %msg, "Job submission failed");
                    upstream("Failed to submit image job")
                }
                JobError::Poll(msg) => {
                    tracing::error!(error = %msg, "Job polling failed");
                    upstream("Failed to query image job")
                }
                JobError::Download(msg) => {
                    tracing::error!(error = %msg, "Image download failed");
                    upstream("Failed to download image")
                }
            },

            // --- Persistence ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
