//! Snapshot persistence.
//!
//! A snapshot is the restart-surviving subset of engine state: the catalog,
//! both settings records and the current index. Playback flags and alerts
//! are not part of it. Snapshots are JSON; unknown fields are ignored
//! and missing ones take their defaults.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::library::Track;
use crate::settings::{AlertSettings, MusicSettings};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub tracks: Vec<Track>,
    pub music: MusicSettings,
    pub alerts: AlertSettings,
    pub current_track_index: usize,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Parse a snapshot blob. Fails on malformed JSON or duplicate track ids.
    pub fn parse(blob: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(blob).map_err(|e| Error::Persistence(e.to_string()))?;

        let mut seen = std::collections::HashSet::new();
        for t in &snapshot.tracks {
            if !t.id.is_empty() && !seen.insert(t.id.as_str()) {
                return Err(Error::Persistence(format!("duplicate track id {:?}", t.id)));
            }
        }
        Ok(snapshot)
    }
}

/// Writes snapshots to a key-value store and reads them back at startup.
pub struct PersistenceSync {
    store: Box<dyn KeyValueStore>,
    key: String,
    last_written: Option<String>,
}

impl PersistenceSync {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last_written: None,
        }
    }

    /// Raw blob currently stored under our key.
    pub fn load(&self) -> Result<Option<String>> {
        self.store.get(&self.key)
    }

    /// Remember `blob` as already persisted, e.g. right after restoring it.
    pub fn mark_written(&mut self, blob: String) {
        self.last_written = Some(blob);
    }

    /// Key a rejected blob is copied to by [`PersistenceSync::set_aside`].
    pub fn rejected_key(&self) -> String {
        format!("{}.rejected", self.key)
    }

    /// Copy a blob that could not be restored to [`Self::rejected_key`],
    /// leaving the live key untouched. Best effort like [`Self::save`].
    pub fn set_aside(&mut self, blob: &str) -> bool {
        let key = self.rejected_key();
        match self.store.set(&key, blob) {
            Ok(()) => {
                warn!(%key, "kept unreadable snapshot");
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "failed to keep unreadable snapshot");
                false
            }
        }
    }

    /// Persist `snapshot`. Best effort: failures are logged, never returned.
    ///
    /// Returns whether a write happened.
    pub fn save(&mut self, snapshot: &Snapshot) -> bool {
        let blob = match snapshot.to_json() {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed to serialize snapshot");
                return false;
            }
        };
        if self.last_written.as_deref() == Some(blob.as_str()) {
            return false;
        }

        match self.store.set(&self.key, &blob) {
            Ok(()) => {
                debug!(key = %self.key, bytes = blob.len(), "snapshot written");
                self.last_written = Some(blob);
                true
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to write snapshot");
                false
            }
        }
    }
}
