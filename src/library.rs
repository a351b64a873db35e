//! Track catalog: the ordered set of playable tracks.
//!
//! The catalog knows nothing about playback. Callers that track a current
//! index use the position returned by [`TrackCatalog::remove`] to fix it up.
//! Editing a track is a `remove` followed by an `add` under the same id.

mod model;
mod scan;

pub use model::{Provenance, Track};
pub use scan::scan;

use crate::error::{Error, Result};


#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    /// Build a catalog from `tracks`, rejecting duplicate ids.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        let mut catalog = Self::default();
        for track in tracks {
            catalog.add(track)?;
        }
        Ok(catalog)
    }

    /// Append `track`. Fails with `DuplicateId` if the id is already present.
    pub fn add(&mut self, track: Track) -> Result<()> {
        if self.position(&track.id).is_some() {
            return Err(Error::DuplicateId(track.id));
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Remove the track with `id`, returning its former position and value.
    pub fn remove(&mut self, id: &str) -> Option<(usize, Track)> {
        let pos = self.position(id)?;
        Some((pos, self.tracks.remove(pos)))
    }

    pub fn find(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Tracks in insertion order.
    pub fn list(&self) -> &[Track] {
        &self.tracks
    }

    /// True if some track already points at `source`.
    pub fn contains_source(&self, source: &str) -> bool {
        self.tracks.iter().any(|t| t.source == source)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
