//! Bounded window of prior panels used as continuity context.
//!
//! During a sequence run the most recently completed panels (scene text
//! plus generated image) are fed back into the next panel's prompt. The
//! window is FIFO: once full, pushing a new panel evicts the oldest.

use std::collections::VecDeque;

use crate::model::PriorPanel;

/// Window size for full-page sequence runs.
pub const SEQUENCE_WINDOW_CAPACITY: usize = 2;

/// Window size for standalone single-panel generation.
pub const SINGLE_PRIOR_CAPACITY: usize = 1;

#[derive(Debug, Clone)]
pub struct ContextWindow {
    capacity: usize,
    entries: VecDeque<PriorPanel>,
}

impl ContextWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Build a window from chronologically ordered panels, keeping only the
    /// newest `capacity` of them.
    pub fn from_prior(prior: impl IntoIterator<Item = PriorPanel>, capacity: usize) -> Self {
        let mut window = Self::new(capacity);
        for panel in prior {
            window.push(panel);
        }
        window
    }

    /// Append a completed panel, evicting the oldest entry when full.
    pub fn push(&mut self, panel: PriorPanel) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(panel);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PriorPanel> {
        self.entries.iter()
    }

    /// Snapshot of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<PriorPanel> {
        self.entries.iter().cloned().collect()
    }
}
