//! Fixed-interval status polling for a single job.
//!
//! A grid poll sends its first query immediately; an upscale poll waits one
//! interval first since the service has only just accepted the request.
//! Queries then go out once per interval until the [`PollTarget`] is met, a
//! query fails, or the token is cancelled. The token is checked before
//! every query.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::{query_job, JobService};
use crate::messages::JobSnapshot;
use crate::JobError;

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What a polling run waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// The candidate grid of a generate job.
    Grid,
    /// The upscaled pick requested after the grid was ready.
    Upscale,
}

impl PollTarget {
    /// Whether `snapshot` ends a run polling for this target.
    ///
    /// The grid stays `ready` while an upscale renders, so an upscale run
    /// also needs `loading` cleared and the upscaled image present.
    pub fn is_complete(self, snapshot: &JobSnapshot) -> bool {
        match self {
            Self::Grid => snapshot.is_ready(),
            Self::Upscale => {
                snapshot.is_ready() && !snapshot.is_loading() && snapshot.upscaled().is_some()
            }
        }
    }

    fn first_query_at(self, interval: Duration) -> Instant {
        match self {
            Self::Grid => Instant::now(),
            Self::Upscale => Instant::now() + interval,
        }
    }
}

/// How a polling run ended.
#[derive(Debug)]
pub enum PollOutcome {
    Ready(JobSnapshot),
    Failed(JobError),
    Cancelled,
}

/// Poll `job_id` until `target` is met, a query fails, or `cancel` fires.
///
/// `on_pending` sees every snapshot that does not yet meet the target.
pub async fn poll_job<F>(
    service: &dyn JobService,
    job_id: &str,
    target: PollTarget,
    interval: Duration,
    cancel: &CancellationToken,
    mut on_pending: F,
) -> PollOutcome
where
    F: FnMut(&JobSnapshot) + Send,
{
    let mut ticker = tokio::time::interval_at(target.first_query_at(interval), interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut attempt = 0u32;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id, attempt, "Polling cancelled");
                return PollOutcome::Cancelled;
            }
            _ = ticker.tick() => {}
        }
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        attempt += 1;
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id, attempt, "Polling cancelled mid-query");
                return PollOutcome::Cancelled;
            }
            result = query_job(service, job_id) => result,
        };

        match result {
            Ok(snapshot) if target.is_complete(&snapshot) => {
                tracing::info!(
                    job_id,
                    attempt,
                    ?target,
                    images = snapshot.images.len(),
                    "Job ready",
                );
                return PollOutcome::Ready(snapshot);
            }
            Ok(snapshot) => {
                tracing::debug!(
                    job_id,
                    attempt,
                    status = %snapshot.status,
                    loading = snapshot.is_loading(),
                    "Job not ready",
                );
                on_pending(&snapshot);
            }
            Err(e) => {
                tracing::warn!(job_id, attempt, error = %e, "Job query failed, polling stopped");
                return PollOutcome::Failed(e);
            }
        }
    }
}
