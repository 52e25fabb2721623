//! Input validation shared by the HTTP layer and the pipeline.
//!
//! All checks run before any network call so a bad request never costs a
//! generation round-trip.

use crate::error::CoreError;
use crate::model::Panel;

/// Upper bound on project names.
pub const MAX_PROJECT_NAME_LEN: usize = 200;

/// Number of candidate images in a grid result that can be upscaled.
pub const UPSCALE_CANDIDATES: u8 = 4;

/// Require a non-blank string field.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Validate a single panel's scene text.
pub fn validate_panel_content(content: &str) -> Result<(), CoreError> {
    require_non_empty("Panel content", content)
}

/// Validate every panel of a sequence run up front.
///
/// Fails on the first blank panel, naming its position, so the run is
/// rejected before any panel is touched.
pub fn validate_sequence(panels: &[Panel]) -> Result<(), CoreError> {
    if panels.is_empty() {
        return Err(CoreError::Validation(
            "Page has no panels to generate".to_string(),
        ));
    }
    match panels.iter().find(|p| p.content.trim().is_empty()) {
        Some(panel) => Err(CoreError::Validation(format!(
            "Please fill in content for all panels before generating images (panel {} is empty)",
            panel.position + 1
        ))),
        None => Ok(()),
    }
}

pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    require_non_empty("Project name", name)?;
    if name.trim().chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Project name must be at most {MAX_PROJECT_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Upscale indices are 1-based positions in the 2x2 candidate grid.
pub fn validate_upscale_index(index: u8) -> Result<(), CoreError> {
    if (1..=UPSCALE_CANDIDATES).contains(&index) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Upscale index must be between 1 and {UPSCALE_CANDIDATES}, got {index}"
        )))
    }
}
