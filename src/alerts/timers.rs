//! Expiry timers, one per queued alert, keyed by alert id.
//!
//! Cancelling is an indexed removal. Firing removes the entry too, so a
//! timer is consumed exactly once either way.

use std::collections::HashMap;
use std::time::Instant;

use super::model::AlertId;

#[derive(Debug, Default)]
pub(crate) struct TimerTable {
    deadlines: HashMap<AlertId, Instant>,
}

impl TimerTable {
    pub fn schedule(&mut self, id: AlertId, deadline: Instant) {
        self.deadlines.insert(id, deadline);
    }

    /// Cancel the timer for `id`. Returns false if none was pending.
    pub fn cancel(&mut self, id: AlertId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_expired(&mut self, now: Instant) -> Vec<AlertId> {
        let mut due: Vec<(Instant, AlertId)> = self
            .deadlines
            .iter()
            .filter(|&(_, &at)| at <= now)
            .map(|(&id, &at)| (at, id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    #[cfg(test)]
    pub fn contains(&self, id: AlertId) -> bool {
        self.deadlines.contains_key(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
