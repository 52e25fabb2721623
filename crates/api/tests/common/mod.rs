#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use panelsmith_api::config::ServerConfig;
use panelsmith_api::router::build_app_router;
use panelsmith_api::state::AppState;
use panelsmith_core::model::{
    DetectedCharacter, ImageData, ImageQuality, PromptPart, SceneInfo,
};
use panelsmith_jobs::{JobError, JobReply, JobRequest, JobService, JobsConfig};
use panelsmith_openai::OpenAiConfig;
use panelsmith_pipeline::{ImageGenerator, PipelineError, SceneAnalyzer};
use panelsmith_store::ProjectStore;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin and a 30-second request
/// timeout. Upstream credentials are set so health reports `ok`.
pub fn test_config(data_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_dir: data_dir.to_path_buf(),
        openai: OpenAiConfig {
            api_key: "test-key".to_string(),
            ..OpenAiConfig::default()
        },
        panel_quality: ImageQuality::High,
        character_quality: ImageQuality::Low,
        jobs: JobsConfig::default(),
        job_poll_interval_secs: 1,
    }
}

// ---------------------------------------------------------------------------
// Upstream fakes
// ---------------------------------------------------------------------------

/// Reports a fixed cast for every panel.
#[derive(Default)]
pub struct FakeAnalyzer {
    pub detected: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl FakeAnalyzer {
    pub fn detect(&self, names: &[&str]) {
        *self.detected.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SceneAnalyzer for FakeAnalyzer {
    async fn analyze(&self, content: &str) -> Result<SceneInfo, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let characters = self
            .detected
            .lock()
            .unwrap()
            .iter()
            .map(|name| DetectedCharacter {
                name: name.clone(),
                description: String::new(),
                role: "main".to_string(),
            })
            .collect();
        Ok(SceneInfo {
            characters,
            scene_description: content.to_string(),
            mood: "calm".to_string(),
            setting: "city".to_string(),
        })
    }
}

/// What one image request looked like.
#[derive(Debug, Clone)]
pub struct ImageCall {
    pub quality: ImageQuality,
    pub text: String,
    pub images: Vec<String>,
}

/// Returns `image-{n}` for the n-th call (1-based). Optionally fails on
/// one call.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: Mutex<Vec<ImageCall>>,
    pub fail_on: Mutex<Option<usize>>,
}

impl FakeGenerator {
    pub fn fail_on(&self, call: usize) {
        *self.fail_on.lock().unwrap() = Some(call);
    }

    pub fn calls(&self) -> Vec<ImageCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ImageCall) -> Result<ImageData, PipelineError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        let n = calls.len();
        if *self.fail_on.lock().unwrap() == Some(n) {
            return Err(PipelineError::Generation("upstream unavailable".into()));
        }
        Ok(ImageData::new(format!("image-{n}")))
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(
        &self,
        parts: &[PromptPart],
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError> {
        let mut text = String::new();
        let mut images = Vec::new();
        for part in parts {
            match part {
                PromptPart::Text(t) => text.push_str(t),
                PromptPart::Image(img) => images.push(img.as_base64().to_string()),
            }
        }
        self.record(ImageCall {
            quality,
            text,
            images,
        })
    }

    async fn generate_from_prompt(
        &self,
        prompt: &str,
        quality: ImageQuality,
    ) -> Result<ImageData, PipelineError> {
        self.record(ImageCall {
            quality,
            text: prompt.to_string(),
            images: Vec::new(),
        })
    }
}

pub const FAKE_JOB_ID: &str = "job-1";

/// Queries after an upscale that still report the render in progress.
pub const FAKE_UPSCALE_RENDER_QUERIES: usize = 1;

/// Job service whose grids are ready on the first query. After an upscale
/// request the job keeps answering with the grid only, marked loading, for
/// [`FAKE_UPSCALE_RENDER_QUERIES`] queries before the upscaled image shows
/// up.
#[derive(Default)]
pub struct FakeJobs {
    pub requests: Mutex<Vec<JobRequest>>,
    upscale_requested: AtomicBool,
    render_queries: AtomicUsize,
    queries: AtomicUsize,
}

impl FakeJobs {
    pub fn requests(&self) -> Vec<JobRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Value {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut images = vec![json!({
            "url": "https://cdn.test/grid.png",
            "image_hash": "hash-1",
            "message_id": "msg-1",
        })];
        let mut loading = false;
        if self.upscale_requested.load(Ordering::SeqCst) {
            loading = self
                .render_queries
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !loading {
                images.push(json!({"url": "https://cdn.test/upscaled.png"}));
            }
        }
        json!({"_id": FAKE_JOB_ID, "status": "ready", "loading": loading, "images": images})
    }
}

#[async_trait]
impl JobService for FakeJobs {
    async fn submit(&self, request: JobRequest) -> Result<JobReply, JobError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = match request {
            JobRequest::Generate { .. } => JobReply {
                status: None,
                data: Some(json!({"id": FAKE_JOB_ID})),
            },
            JobRequest::Upscale { .. } => {
                self.render_queries
                    .store(FAKE_UPSCALE_RENDER_QUERIES, Ordering::SeqCst);
                self.upscale_requested.store(true, Ordering::SeqCst);
                JobReply {
                    status: Some(0),
                    data: None,
                }
            }
            JobRequest::Query { .. } => JobReply {
                status: None,
                data: Some(self.snapshot()),
            },
        };
        Ok(reply)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, JobError> {
        Ok(url.rsplit('/').next().unwrap_or_default().as_bytes().to_vec())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Router plus handles on the fakes and state behind it.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub analyzer: Arc<FakeAnalyzer>,
    pub generator: Arc<FakeGenerator>,
    pub jobs: Arc<FakeJobs>,
    _data_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Build the full application router over a temporary project store and
/// in-memory upstream fakes.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub async fn build_test_app() -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let config = test_config(data_dir.path());
    let store = ProjectStore::open(data_dir.path()).await.unwrap();

    let analyzer = Arc::new(FakeAnalyzer::default());
    let generator = Arc::new(FakeGenerator::default());
    let jobs = Arc::new(FakeJobs::default());

    let state = AppState::new(
        config.clone(),
        store,
        analyzer.clone(),
        generator.clone(),
        jobs.clone(),
    );
    let app = build_app_router(state.clone(), &config);

    TestApp {
        app,
        state,
        analyzer,
        generator,
        jobs,
        _data_dir: data_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Create a project and return its JSON.
pub async fn create_project(app: Router, name: &str) -> Value {
    let response = post_json(app, "/api/v1/projects", json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
