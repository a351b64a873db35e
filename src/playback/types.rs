//! Playback state types shared with the outbound query surface.

use crate::device::LoadTicket;

/// Where the music state machine currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Music is disabled or there is nothing to play.
    Idle,
    Stopped,
    /// A load is in flight on the music device.
    Loading,
    Playing,
    Paused,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Read-only view of the playback state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub current_track_index: usize,
    pub is_playing: bool,
    pub is_loading: bool,
    pub status: PlayerStatus,
}

/// The one load allowed in flight, and what it was asked to play.
#[derive(Clone, Debug)]
pub(crate) struct PendingLoad {
    pub ticket: LoadTicket,
    pub index: usize,
    pub track_id: String,
}
