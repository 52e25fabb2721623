//! Single-slot owner of the job polling task.
//!
//! [`JobController`] allows one active poll at a time: starting a new one
//! cancels the previous task's token first. The latest state of every
//! job polled is kept in an in-memory record map; re-polling a job
//! replaces its record.
//!
//! A record is `submitted` until its poll has made a query, `polling`
//! while queries report the job unfinished, then `ready`, `failed` or
//! `cancelled`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use panelsmith_core::model::{ImageData, ImageKind};
use panelsmith_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::client::{download_image, submit_generate, submit_upscale, JobService};
use crate::messages::JobSnapshot;
use crate::poller::{poll_job, PollOutcome, PollTarget};
use crate::JobError;

/// Lifecycle of a polled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Submitted,
    Polling,
    Ready,
    Failed,
    Cancelled,
}

/// Latest known state of one job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<JobSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: Timestamp,
    /// Poll run that owns this record.
    #[serde(skip)]
    generation: u64,
}

impl JobRecord {
    fn new(job_id: &str, state: JobState, snapshot: Option<JobSnapshot>, generation: u64) -> Self {
        Self {
            job_id: job_id.to_string(),
            state,
            snapshot,
            error: None,
            updated_at: chrono::Utc::now(),
            generation,
        }
    }
}

/// Bookkeeping for the running poll task.
struct ActivePoll {
    job_id: String,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

/// Record map shared with poll tasks. Never held across an await.
#[derive(Clone, Default)]
struct Records(Arc<RwLock<HashMap<String, JobRecord>>>);

impl Records {
    fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .cloned()
    }

    fn insert(&self, record: JobRecord) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.job_id.clone(), record);
    }

    /// Apply `update` to the record of `job_id` if poll run `generation`
    /// still owns it.
    fn update_owned(&self, job_id: &str, generation: u64, update: impl FnOnce(&mut JobRecord)) {
        let mut records = self.0.write().unwrap_or_else(PoisonError::into_inner);
        match records.get_mut(job_id) {
            Some(record) if record.generation == generation => {
                update(record);
                record.updated_at = chrono::Utc::now();
            }
            // A newer poll of the same job owns the record.
            _ => {}
        }
    }
}

pub struct JobController {
    service: Arc<dyn JobService>,
    interval: Duration,
    active: Mutex<Option<ActivePoll>>,
    records: Records,
    next_generation: AtomicU64,
    /// Parent of every poll token; cancelled on shutdown.
    shutdown: CancellationToken,
}

impl JobController {
    pub fn new(service: Arc<dyn JobService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            active: Mutex::new(None),
            records: Records::default(),
            next_generation: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// Submit a generate job and start polling it for the candidate grid.
    pub async fn start_generation(&self, prompt: &str) -> Result<String, JobError> {
        let job_id = submit_generate(self.service.as_ref(), prompt).await?;
        tracing::info!(job_id = %job_id, "Reference job submitted");
        self.spawn_poll(&job_id, PollTarget::Grid, JobState::Submitted)
            .await;
        Ok(job_id)
    }

    /// Poll `job_id` for its grid, cancelling whatever poll was running
    /// before.
    pub async fn start_polling(&self, job_id: &str) {
        self.spawn_poll(job_id, PollTarget::Grid, JobState::Polling)
            .await;
    }

    async fn spawn_poll(&self, job_id: &str, target: PollTarget, initial: JobState) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            tracing::info!(
                previous_job_id = %previous.job_id,
                job_id,
                "Cancelling previous poll",
            );
            previous.cancel.cancel();
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let snapshot = self.records.get(job_id).and_then(|r| r.snapshot);
        self.records
            .insert(JobRecord::new(job_id, initial, snapshot, generation));

        let cancel = self.shutdown.child_token();
        let task = tokio::spawn(run_poll(
            Arc::clone(&self.service),
            job_id.to_string(),
            target,
            self.interval,
            cancel.clone(),
            self.records.clone(),
            generation,
        ));
        *active = Some(ActivePoll {
            job_id: job_id.to_string(),
            cancel,
            task,
        });
    }

    /// Request an upscale of candidate `index` and poll the job until the
    /// upscaled image is attached.
    pub async fn upscale(&self, job_id: &str, index: u8) -> Result<(), JobError> {
        let grid = self
            .records
            .get(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.to_string()))?
            .snapshot
            .and_then(|s| s.grid().cloned())
            .ok_or_else(|| JobError::NotReady(job_id.to_string()))?;

        submit_upscale(
            self.service.as_ref(),
            index,
            &grid.image_hash,
            &grid.message_id,
        )
        .await?;
        tracing::info!(job_id, index, "Upscale accepted");
        self.spawn_poll(job_id, PollTarget::Upscale, JobState::Submitted)
            .await;
        Ok(())
    }

    /// Cancel the active poll. Returns the job id it was polling.
    pub async fn stop_polling(&self) -> Option<String> {
        let previous = self.active.lock().await.take()?;
        previous.cancel.cancel();
        tracing::info!(job_id = %previous.job_id, "Polling stopped");
        Some(previous.job_id)
    }

    pub async fn active_job(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|a| !a.task.is_finished())
            .map(|a| a.job_id.clone())
    }

    pub async fn record(&self, job_id: &str) -> Option<JobRecord> {
        self.records.get(job_id)
    }

    /// Wait for the active poll task, if any, to finish.
    pub async fn wait_for_active(&self) {
        let active = self.active.lock().await.take();
        if let Some(active) = active {
            let _ = active.task.await;
        }
    }

    /// Download the image a ready job would contribute as a reference.
    ///
    /// Uses the upscaled image when one exists, otherwise the grid.
    pub async fn fetch_reference(&self, job_id: &str) -> Result<(ImageData, ImageKind), JobError> {
        let record = self
            .records
            .get(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.to_string()))?;
        let (url, kind) = record
            .snapshot
            .as_ref()
            .filter(|s| s.is_ready())
            .and_then(|s| s.best_image())
            .map(|(image, kind)| (image.url.clone(), kind))
            .ok_or_else(|| JobError::NotReady(job_id.to_string()))?;

        let image = download_image(self.service.as_ref(), &url).await?;
        tracing::info!(job_id, kind = kind.as_str(), image_bytes = image.len(), "Reference image fetched");
        Ok((image, kind))
    }

    /// Cancel polling and wait briefly for the task to exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job controller");
        self.shutdown.cancel();
        if let Some(active) = self.active.lock().await.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), active.task).await;
        }
    }
}

async fn run_poll(
    service: Arc<dyn JobService>,
    job_id: String,
    target: PollTarget,
    interval: Duration,
    cancel: CancellationToken,
    records: Records,
    generation: u64,
) {
    let outcome = poll_job(service.as_ref(), &job_id, target, interval, &cancel, |pending| {
        records.update_owned(&job_id, generation, |record| {
            record.state = JobState::Polling;
            record.snapshot = Some(pending.clone());
        });
    })
    .await;

    records.update_owned(&job_id, generation, |record| match outcome {
        PollOutcome::Ready(snapshot) => {
            record.state = JobState::Ready;
            record.snapshot = Some(snapshot);
        }
        PollOutcome::Failed(e) => {
            record.state = JobState::Failed;
            record.error = Some(e.to_string());
        }
        PollOutcome::Cancelled => record.state = JobState::Cancelled,
    });
}
