//! Scene analysis seam.

use async_trait::async_trait;
use panelsmith_core::model::SceneInfo;
use panelsmith_openai::OpenAiApi;

use crate::PipelineError;

/// Extracts characters, scene description, mood and setting from panel
/// text.
#[async_trait]
pub trait SceneAnalyzer: Send + Sync {
    async fn analyze(&self, content: &str) -> Result<SceneInfo, PipelineError>;
}

#[async_trait]
impl SceneAnalyzer for OpenAiApi {
    async fn analyze(&self, content: &str) -> Result<SceneInfo, PipelineError> {
        self.analyze_scene(content)
            .await
            .map_err(|e| PipelineError::Analysis(e.to_string()))
    }
}
