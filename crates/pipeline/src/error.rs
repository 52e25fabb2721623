use panelsmith_core::error::CoreError;

/// Errors from panel generation.
///
/// Any of these aborts the current panel and, in a sequence run, the whole
/// run. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input rejected before any upstream call.
    #[error("{0}")]
    Validation(String),

    /// Scene analysis failed or returned an unusable response.
    #[error("Scene analysis failed: {0}")]
    Analysis(String),

    /// Image synthesis failed or produced no image.
    #[error("Image generation failed: {0}")]
    Generation(String),
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}
