use std::sync::Arc;

use panelsmith_jobs::{JobController, JobService};
use panelsmith_pipeline::{
    ImageGenerator, PanelPipeline, PanelSynthesizer, SceneAnalyzer, SequenceOrchestrator,
};
use panelsmith_store::ProjectStore;

use crate::config::ServerConfig;
use crate::in_flight::InFlightRuns;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Project document on local disk.
    pub store: Arc<ProjectStore>,
    /// Single-panel generation (standalone routes).
    pub panels: PanelPipeline,
    /// Whole-page generation.
    pub sequences: SequenceOrchestrator,
    /// Direct image generation for character portraits.
    pub images: Arc<dyn ImageGenerator>,
    /// Reference-image jobs and the single active poll.
    pub jobs: Arc<JobController>,
    pub in_flight: InFlightRuns,
}

impl AppState {
    /// Wire the pipeline and job controller around the given upstream
    /// services.
    pub fn new(
        config: ServerConfig,
        store: ProjectStore,
        analyzer: Arc<dyn SceneAnalyzer>,
        generator: Arc<dyn ImageGenerator>,
        job_service: Arc<dyn JobService>,
    ) -> Self {
        let synthesizer = PanelSynthesizer::new(Arc::clone(&generator), config.panel_quality);
        let panels = PanelPipeline::new(analyzer, synthesizer);
        let sequences = SequenceOrchestrator::new(panels.clone());
        let jobs = Arc::new(JobController::new(job_service, config.job_poll_interval()));

        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            panels,
            sequences,
            images: generator,
            jobs,
            in_flight: InFlightRuns::default(),
        }
    }
}
