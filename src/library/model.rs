use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who added a track to the catalog, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provenance {
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            added_by: "system".to_string(),
            added_at: Utc::now(),
        }
    }
}

/// A playable catalog entry.
///
/// Tracks are never edited in place; an edit is a full replacement under the
/// same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// URI or filesystem path handed to the playback device.
    pub source: String,
    /// Length in whole seconds, 0 when unknown.
    pub duration_secs: u64,
    pub provenance: Provenance,
    pub active: bool,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            artist: String::new(),
            source: String::new(),
            duration_secs: 0,
            provenance: Provenance::default(),
            active: true,
        }
    }
}

impl Track {
    /// Create a track with a fresh random id.
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn added_by(mut self, who: impl Into<String>) -> Self {
        self.provenance.added_by = who.into();
        self
    }

    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}
