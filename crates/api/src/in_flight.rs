//! Per-project guard against overlapping sequence runs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Project ids with a sequence run in progress.
#[derive(Clone, Default)]
pub struct InFlightRuns {
    running: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRuns {
    /// Mark `project_id` as running. Returns `None` if it already is.
    ///
    /// The flag clears when the returned guard drops.
    pub fn try_acquire(&self, project_id: &str) -> Option<RunGuard> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if !running.insert(project_id.to_string()) {
            return None;
        }
        Some(RunGuard {
            runs: self.clone(),
            project_id: project_id.to_string(),
        })
    }

    pub fn is_running(&self, project_id: &str) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(project_id)
    }
}

/// Clears the project's in-flight flag on drop.
pub struct RunGuard {
    runs: InFlightRuns,
    project_id: String,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.runs
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_guard_drops() {
        let runs = InFlightRuns::default();

        let guard = runs.try_acquire("project-1").expect("first acquire");
        assert!(runs.is_running("project-1"));
        assert!(runs.try_acquire("project-1").is_none());
        assert!(runs.try_acquire("project-2").is_some());

        drop(guard);
        assert!(!runs.is_running("project-1"));
        assert!(runs.try_acquire("project-1").is_some());
    }
}
