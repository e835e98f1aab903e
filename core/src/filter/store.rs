//! In-memory holder for the current priority filter

use tokio::sync::watch;
use tracing::debug;

use super::model::PriorityFilter;
use crate::Result;

/// Current filter selection; starts at `All` and is never persisted
pub struct FilterStore {
    priority: watch::Sender<PriorityFilter>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        let (priority, _) = watch::channel(PriorityFilter::default());
        Self { priority }
    }

    pub fn priority(&self) -> PriorityFilter {
        *self.priority.borrow()
    }

    /// Replace the current filter; subscribers are only woken on an actual change
    pub fn set_priority(&self, priority: PriorityFilter) {
        let changed = self.priority.send_if_modified(|current| {
            if *current == priority {
                return false;
            }
            *current = priority;
            true
        });
        if changed {
            debug!("Priority filter set to {}", priority);
        }
    }

    /// Parse and apply a filter given as text; unknown values leave the filter unchanged
    pub fn set_priority_str(&self, value: &str) -> Result<PriorityFilter> {
        let priority = value.parse::<PriorityFilter>()?;
        self.set_priority(priority);
        Ok(priority)
    }

    pub fn subscribe(&self) -> watch::Receiver<PriorityFilter> {
        self.priority.subscribe()
    }
}
