//! Character reference images through the asynchronous job service.
//!
//! The service accepts `generate`, `upscale` and `query` requests on a
//! single endpoint. A generate request returns a job id whose status is
//! then polled until the candidate grid is `ready`; one candidate can be
//! upscaled, after which the same job id is polled again until the
//! upscaled image is attached.
//!
//! [`JobController`] owns the one polling task allowed at a time and keeps
//! the latest record per job id.

pub mod client;
pub mod controller;
pub mod messages;
pub mod poller;

pub use client::{JobService, JobsApi, JobsConfig};
pub use controller::{JobController, JobRecord, JobState};
pub use messages::{JobImage, JobReply, JobRequest, JobSnapshot};
pub use poller::{poll_job, PollOutcome, PollTarget};

/// Errors from the job service and the polling loop.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// A generate or upscale request was rejected or could not be sent.
    #[error("Job submission failed: {0}")]
    Submission(String),

    /// A status query failed; polling stops.
    #[error("Job polling failed: {0}")]
    Poll(String),

    /// The finished image could not be fetched.
    #[error("Image download failed: {0}")]
    Download(String),

    /// No record exists for the job id.
    #[error("Unknown job {0}")]
    UnknownJob(String),

    /// The job has no candidate images yet.
    #[error("Job {0} is not ready")]
    NotReady(String),
}
