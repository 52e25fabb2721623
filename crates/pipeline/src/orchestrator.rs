//! Sequential page generation with a sliding context window.
//!
//! Panels run one at a time in position order. After each panel its scene
//! text and image are pushed onto a window holding the last
//! [`SEQUENCE_WINDOW_CAPACITY`] panels, which conditions the next one.
//! A run either produces every panel or nothing: callers only commit
//! outcomes from a successful run.

use panelsmith_core::context::{ContextWindow, SEQUENCE_WINDOW_CAPACITY};
use panelsmith_core::model::{Character, Page, Panel, PriorPanel};
use panelsmith_core::validation::validate_sequence;

use crate::panel::{PanelOutcome, PanelPipeline};
use crate::PipelineError;

/// Outcome of one panel in a sequence run.
#[derive(Debug, Clone)]
pub struct GeneratedPanel {
    pub panel_id: String,
    pub position: usize,
    pub outcome: PanelOutcome,
}

#[derive(Clone)]
pub struct SequenceOrchestrator {
    pipeline: PanelPipeline,
}

impl SequenceOrchestrator {
    pub fn new(pipeline: PanelPipeline) -> Self {
        Self { pipeline }
    }

    /// Generate every panel in position order.
    ///
    /// All panel contents are validated before the first upstream call.
    /// The first failure aborts the run and discards earlier outcomes.
    pub async fn run(
        &self,
        panels: &[Panel],
        roster: &[Character],
    ) -> Result<Vec<GeneratedPanel>, PipelineError> {
        validate_sequence(panels)?;

        let mut ordered: Vec<&Panel> = panels.iter().collect();
        ordered.sort_by_key(|p| p.position);

        let mut window = ContextWindow::new(SEQUENCE_WINDOW_CAPACITY);
        let mut generated = Vec::with_capacity(ordered.len());

        for (index, panel) in ordered.into_iter().enumerate() {
            tracing::info!(
                panel_index = index,
                panel_id = %panel.id,
                window = window.len(),
                "Generating panel",
            );
            let prior = window.to_vec();
            let outcome = self
                .pipeline
                .generate_validated(&panel.content, roster, &prior)
                .await
                .inspect_err(|e| {
                    tracing::error!(panel_index = index, error = %e, "Sequence run aborted");
                })?;

            window.push(PriorPanel {
                scene: panel.content.clone(),
                image: outcome.image.clone(),
            });
            generated.push(GeneratedPanel {
                panel_id: panel.id.clone(),
                position: panel.position,
                outcome,
            });
        }

        tracing::info!(panels = generated.len(), "Sequence run complete");
        Ok(generated)
    }
}

/// Store generated images on their panels. Returns how many panels were
/// updated; outcomes for panels no longer on the page are skipped.
pub fn apply_outcomes(page: &mut Page, generated: &[GeneratedPanel]) -> usize {
    let mut applied = 0;
    for item in generated {
        match page.panel_mut(&item.panel_id) {
            Some(panel) => {
                panel.image = Some(item.outcome.image.clone());
                applied += 1;
            }
            None => {
                tracing::warn!(panel_id = %item.panel_id, "Generated panel no longer on page");
            }
        }
    }
    applied
}
