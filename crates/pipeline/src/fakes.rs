//! In-memory analyzer and generator doubles for pipeline tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use panelsmith_core::model::{
    DetectedCharacter, ImageData, ImageQuality, PromptPart, SceneInfo,
};

use crate::analyzer::SceneAnalyzer;
use crate::synthesizer::ImageGenerator;
use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Analyze(String),
    Generate(String),
}

/// Shared, ordered record of upstream calls across fakes.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeAnalyzer {
    detected: Vec<String>,
    fail: bool,
    calls: Mutex<Vec<String>>,
    log: EventLog,
}

impl FakeAnalyzer {
    pub fn detecting(names: &[&str]) -> Self {
        Self {
            detected: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SceneAnalyzer for FakeAnalyzer {
    async fn analyze(&self, content: &str) -> Result<SceneInfo, PipelineError> {
        self.calls.lock().unwrap().push(content.to_string());
        self.log.push(Event::Analyze(content.to_string()));
        if self.fail {
            return Err(PipelineError::Analysis("analyzer offline".into()));
        }
        Ok(SceneInfo {
            characters: self
                .detected
                .iter()
                .map(|name| DetectedCharacter {
                    name: name.clone(),
                    description: String::new(),
                    role: "supporting".into(),
                })
                .collect(),
            scene_description: content.to_string(),
            mood: "calm".into(),
            setting: "somewhere".into(),
        })
    }
}

/// What one generation request looked like.
#[derive(Debug, Clone)]
pub struct GenerateCall {
    pub quality: ImageQuality,
    pub main_text: String,
    /// Label parts following the main instructions, in order.
    pub labels: Vec<String>,
    pub image_count: usize,
    /// Images attached after "Previous panel" labels, oldest first.
    pub prior_images: Vec<String>,
}

/// Returns `image-<n>` for the n-th call (1-based).
#[derive(Default)]
pub struct RecordingGenerator {
    fail_on: Option<usize>,
    calls: Mutex<Vec<GenerateCall>>,
    log: EventLog,
}

impl RecordingGenerator {
    /// Fail the `call`-th request (1-based).
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Default::default()
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn calls(&self) -> Vec<GenerateCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn scene_of(main_text: &str) -> String {
    main_text
        .strip_prefix("Generate a comic book panel illustration for: \"")
        .and_then(|rest| rest.split("\".").next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ImageGenerator for RecordingGenerator {
    async fn generate(
        &self,
        parts: &[PromptPart],
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError> {
        let main_text = match parts.first() {
            Some(PromptPart::Text(t)) => t.clone(),
            _ => String::new(),
        };
        let mut labels = Vec::new();
        let mut prior_images = Vec::new();
        let mut last_label = String::new();
        for part in parts.iter().skip(1) {
            match part {
                PromptPart::Text(t) => {
                    labels.push(t.clone());
                    last_label = t.clone();
                }
                PromptPart::Image(image) if last_label.starts_with("Previous panel") => {
                    prior_images.push(image.as_base64().to_string());
                }
                PromptPart::Image(_) => {}
            }
        }
        let image_count = parts
            .iter()
            .filter(|p| matches!(p, PromptPart::Image(_)))
            .count();

        self.log.push(Event::Generate(scene_of(&main_text)));
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(GenerateCall {
                quality,
                main_text,
                labels,
                image_count,
                prior_images,
            });
            calls.len()
        };

        if self.fail_on == Some(n) {
            return Err(PipelineError::Generation("no image generated".into()));
        }
        Ok(ImageData::new(format!("image-{n}")))
    }

    async fn generate_from_prompt(
        &self,
        prompt: &str,
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError> {
        self.generate(&[PromptPart::Text(prompt.to_string())], quality)
            .await
    }
}
