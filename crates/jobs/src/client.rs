//! HTTP client for the job service.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use panelsmith_core::model::ImageData;

use crate::messages::{JobReply, JobRequest, JobSnapshot};
use crate::JobError;

pub const DEFAULT_JOBS_API_URL: &str = "https://backend.build.mugafi.com/v1/external/midjourney";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport seam for the job service.
///
/// Production uses [`JobsApi`]; tests substitute in-memory fakes.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Post one request and return the raw reply envelope.
    async fn submit(&self, request: JobRequest) -> Result<JobReply, JobError>;

    /// Fetch the bytes behind an image URL reported by the service.
    async fn download(&self, url: &str) -> Result<Vec<u8>, JobError>;
}

/// Start a generate job. Returns the service-assigned job id.
pub async fn submit_generate(service: &dyn JobService, prompt: &str) -> Result<String, JobError> {
    let reply = service.submit(JobRequest::generate(prompt)).await?;
    reply
        .job_id()
        .map(str::to_string)
        .ok_or_else(|| JobError::Submission("reply carried no job id".to_string()))
}

/// Ask for one candidate of the grid to be upscaled.
pub async fn submit_upscale(
    service: &dyn JobService,
    index: u8,
    image_hash: &str,
    message_id: &str,
) -> Result<(), JobError> {
    let reply = service
        .submit(JobRequest::Upscale {
            index,
            image_hash: image_hash.to_string(),
            message_id: message_id.to_string(),
        })
        .await?;
    if reply.upscale_accepted() {
        Ok(())
    } else {
        Err(JobError::Submission(format!(
            "upscale not accepted (status {:?})",
            reply.status
        )))
    }
}

/// Query a job's current state.
///
/// Submission-level failures surface as [`JobError::Poll`] since queries
/// only happen while polling.
pub async fn query_job(service: &dyn JobService, job_id: &str) -> Result<JobSnapshot, JobError> {
    let reply = service
        .submit(JobRequest::query(job_id))
        .await
        .map_err(|e| match e {
            JobError::Submission(msg) => JobError::Poll(msg),
            other => other,
        })?;
    match reply.snapshot() {
        Some(Ok(snapshot)) => Ok(snapshot),
        Some(Err(e)) => Err(JobError::Poll(format!("malformed status: {e}"))),
        None => Err(JobError::Poll("reply carried no status".to_string())),
    }
}

/// Download an image and encode it for storage as a reference.
pub async fn download_image(service: &dyn JobService, url: &str) -> Result<ImageData, JobError> {
    let bytes = service.download(url).await?;
    if bytes.is_empty() {
        return Err(JobError::Download(format!("empty body from {url}")));
    }
    tracing::debug!(bytes = bytes.len(), "Downloaded job image");
    Ok(ImageData::new(
        base64::engine::general_purpose::STANDARD.encode(bytes),
    ))
}

#[derive(Debug, Clone)]
pub struct JobsConfig {
    pub api_url: String,
    /// Sent verbatim as the `Authorization` header.
    pub api_token: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_JOBS_API_URL.to_string(),
            api_token: String::new(),
        }
    }
}

/// [`JobService`] over HTTP.
pub struct JobsApi {
    client: reqwest::Client,
    config: JobsConfig,
}

impl JobsApi {
    pub fn new(config: JobsConfig) -> Result<Self, JobError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| JobError::Submission(format!("client setup failed: {e}")))?;
        Ok(Self { client, config })
    }

    /// Turn a non-2xx response into an error carrying status and body.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(format!("job service error ({}): {body}", status.as_u16()))
    }
}

#[async_trait]
impl JobService for JobsApi {
    async fn submit(&self, request: JobRequest) -> Result<JobReply, JobError> {
        let kind = request.kind();
        tracing::debug!(kind, "Sending job request");
        let response = self
            .client
            .post(&self.config.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.config.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| JobError::Submission(e.to_string()))?;
        let response = Self::check_status(response)
            .await
            .map_err(JobError::Submission)?;
        response
            .json::<JobReply>()
            .await
            .map_err(|e| JobError::Submission(format!("unreadable {kind} reply: {e}")))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, JobError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| JobError::Download(e.to_string()))?;
        let response = Self::check_status(response)
            .await
            .map_err(JobError::Download)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| JobError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
