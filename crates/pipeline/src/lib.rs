//! Panel image generation pipeline.
//!
//! One panel goes through scene analysis, reference resolution against the
//! roster, and prompt-conditioned image synthesis ([`PanelPipeline`]). A
//! page is generated by running panels strictly in order while carrying
//! the last generated panels forward as context ([`SequenceOrchestrator`]).

pub mod analyzer;
pub mod error;
pub mod orchestrator;
pub mod panel;
pub mod prompt;
pub mod synthesizer;

#[cfg(test)]
mod fakes;

pub use analyzer::SceneAnalyzer;
pub use error::PipelineError;
pub use orchestrator::{apply_outcomes, GeneratedPanel, SequenceOrchestrator};
pub use panel::{PanelOutcome, PanelPipeline};
pub use synthesizer::{ImageGenerator, PanelSynthesizer};
