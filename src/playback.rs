//! Music playback state machine.
//!
//! `Idle -> Stopped -> Loading -> Playing <-> Paused`, back to `Loading` on
//! every track change and to `Idle` when the catalog empties or music is
//! disabled. The controller is the only thing that drives the music device.
//!
//! Loads complete asynchronously. While one is in flight no second load is
//! issued; a track change during that window only moves the target index,
//! and the completion handler notices the mismatch, discards its own result
//! and loads the new target.

mod shuffle;
mod types;

pub use types::{PlaybackState, PlayerStatus};

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::device::{LoadTicket, PlaybackDevice};
use crate::error::{Error, Result};
use crate::library::TrackCatalog;
use crate::settings::{MusicSettings, RepeatMode};

use shuffle::ShuffleOrder;
use types::PendingLoad;


pub struct PlaybackController {
    device: Box<dyn PlaybackDevice>,
    status: PlayerStatus,
    index: usize,
    in_flight: Option<PendingLoad>,
    /// Ticket of the source currently playing, to match `Ended` events.
    playing_ticket: Option<LoadTicket>,
    last_ticket: LoadTicket,
    shuffle: ShuffleOrder,
}

impl PlaybackController {
    pub fn new(device: Box<dyn PlaybackDevice>, rng: StdRng) -> Self {
        Self {
            device,
            status: PlayerStatus::Idle,
            index: 0,
            in_flight: None,
            playing_ticket: None,
            last_ticket: LoadTicket(0),
            shuffle: ShuffleOrder::new(rng),
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_track_index: self.index,
            is_playing: self.status == PlayerStatus::Playing,
            is_loading: self.in_flight.is_some(),
            status: self.status,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Reset to a resting state at `index` (clamped), e.g. after a restore.
    pub fn reset(&mut self, catalog: &TrackCatalog, music: &MusicSettings, index: usize) {
        self.halt();
        self.index = if index < catalog.len() { index } else { 0 };
        self.status = resting(catalog, music);
        self.shuffle.invalidate();
        self.device.set_volume(music.volume);
    }

    /// Start (or resume) playback.
    ///
    /// Returns whether the command was accepted.
    pub fn play(
        &mut self,
        catalog: &TrackCatalog,
        music: &MusicSettings,
        index: Option<usize>,
    ) -> bool {
        if !music.enabled || catalog.is_empty() {
            return false;
        }
        let target = index.unwrap_or(self.index);
        if target >= catalog.len() {
            debug!(target, len = catalog.len(), "play index out of range");
            return false;
        }

        if self.in_flight.is_some() {
            if index.is_none() {
                debug!("load already in flight; play rejected");
                return false;
            }
            // Retarget: the pending completion sees the new index and reloads.
            self.index = target;
            self.shuffle.sync(target);
            debug!(target, "retargeted in-flight load");
            return true;
        }

        if index.is_none() && self.status == PlayerStatus::Paused {
            self.device.resume();
            self.status = PlayerStatus::Playing;
            return true;
        }

        self.begin_load(catalog, target);
        true
    }

    /// Pause the device. No-op unless playing.
    pub fn pause(&mut self) -> bool {
        if self.status != PlayerStatus::Playing {
            return false;
        }
        self.device.pause();
        self.status = PlayerStatus::Paused;
        true
    }

    pub fn stop(&mut self, catalog: &TrackCatalog, music: &MusicSettings) {
        self.halt();
        self.status = resting(catalog, music);
    }

    pub fn next(&mut self, catalog: &TrackCatalog, music: &MusicSettings) -> bool {
        if !music.enabled || catalog.is_empty() {
            return false;
        }
        match self.successor(catalog.len(), music) {
            Some(target) => self.play(catalog, music, Some(target)),
            None => false,
        }
    }

    pub fn previous(&mut self, catalog: &TrackCatalog, music: &MusicSettings) -> bool {
        if !music.enabled || catalog.is_empty() {
            return false;
        }
        let len = catalog.len();
        let wrap = music.repeat == RepeatMode::All;
        let target = if music.shuffle {
            self.shuffle.prev(len, self.index, wrap)
        } else if self.index > 0 {
            Some(self.index - 1)
        } else if wrap {
            Some(len - 1)
        } else {
            None
        };
        match target {
            Some(target) => self.play(catalog, music, Some(target)),
            None => false,
        }
    }

    /// Handle a `Loaded` event from the music device.
    ///
    /// Returns `Err(Error::Device)` when the current load failed; playback is
    /// already back to `Stopped` by then.
    pub fn on_load_finished(
        &mut self,
        catalog: &TrackCatalog,
        music: &MusicSettings,
        ticket: LoadTicket,
        result: std::result::Result<(), String>,
    ) -> Result<()> {
        if self.in_flight.as_ref().map(|p| p.ticket) != Some(ticket) {
            debug!(?ticket, "ignoring completion of an abandoned load");
            return Ok(());
        }
        let Some(pending) = self.in_flight.take() else {
            return Ok(());
        };

        let still_wanted = pending.index == self.index
            && catalog
                .get(self.index)
                .is_some_and(|t| t.id == pending.track_id);
        if !still_wanted {
            debug!(
                completed = pending.index,
                wanted = self.index,
                "discarding stale load"
            );
            if music.enabled && self.index < catalog.len() {
                self.begin_load(catalog, self.index);
            } else {
                self.halt();
                self.status = resting(catalog, music);
            }
            return Ok(());
        }

        match result {
            Ok(()) => {
                self.status = PlayerStatus::Playing;
                self.playing_ticket = Some(ticket);
                info!(index = self.index, track = %pending.track_id, "playing");
                Ok(())
            }
            Err(reason) => {
                self.status = resting(catalog, music);
                self.playing_ticket = None;
                warn!(index = self.index, track = %pending.track_id, %reason, "track failed to load");
                Err(Error::Device(reason))
            }
        }
    }

    /// Handle an `Ended` event from the music device.
    pub fn on_track_ended(
        &mut self,
        catalog: &TrackCatalog,
        music: &MusicSettings,
        ticket: LoadTicket,
    ) {
        if self.playing_ticket != Some(ticket) || self.status != PlayerStatus::Playing {
            debug!(?ticket, "ignoring end of a source that is no longer current");
            return;
        }
        self.playing_ticket = None;

        if !music.enabled || catalog.is_empty() {
            self.status = resting(catalog, music);
            return;
        }

        let target = if music.repeat == RepeatMode::One {
            Some(self.index)
        } else {
            self.successor(catalog.len(), music)
        };
        match target {
            Some(target) => self.begin_load(catalog, target),
            None => {
                debug!("end of catalog; stopping");
                self.status = PlayerStatus::Stopped;
            }
        }
    }

    /// Fix up the current index after the track at `pos` left the catalog.
    /// `catalog` is the catalog after the removal.
    pub fn on_track_removed(&mut self, catalog: &TrackCatalog, music: &MusicSettings, pos: usize) {
        self.shuffle.invalidate();
        if catalog.is_empty() {
            self.halt();
            self.index = 0;
            self.status = PlayerStatus::Idle;
            return;
        }

        if let Some(p) = self.in_flight.as_mut() {
            if p.index > pos {
                p.index -= 1;
            }
        }

        if pos < self.index {
            self.index -= 1;
        } else if pos == self.index {
            // Whatever was loaded for the removed track is gone with it.
            if !matches!(self.status, PlayerStatus::Stopped | PlayerStatus::Idle) {
                self.halt();
                self.status = resting(catalog, music);
            }
            if self.index >= catalog.len() {
                self.index = 0;
            }
        }
    }

    /// A track was appended.
    pub fn on_track_added(&mut self, catalog: &TrackCatalog, music: &MusicSettings) {
        self.shuffle.invalidate();
        if self.status == PlayerStatus::Idle {
            self.status = resting(catalog, music);
        }
    }

    /// React to a committed change of the music record.
    pub fn on_settings_changed(
        &mut self,
        catalog: &TrackCatalog,
        old: &MusicSettings,
        new: &MusicSettings,
    ) {
        if old.volume != new.volume {
            self.device.set_volume(new.volume);
        }
        if old.enabled && !new.enabled {
            info!("music disabled");
            self.halt();
            self.status = PlayerStatus::Idle;
        }
        if !old.shuffle && new.shuffle {
            self.shuffle.rebuild(catalog.len(), self.index);
        }
        if matches!(self.status, PlayerStatus::Idle | PlayerStatus::Stopped) {
            self.status = resting(catalog, new);
        }
    }

    fn successor(&mut self, len: usize, music: &MusicSettings) -> Option<usize> {
        let wrap = music.repeat == RepeatMode::All;
        if music.shuffle {
            self.shuffle.next(len, self.index, wrap)
        } else if self.index + 1 < len {
            Some(self.index + 1)
        } else if wrap {
            Some(0)
        } else {
            None
        }
    }

    fn begin_load(&mut self, catalog: &TrackCatalog, target: usize) {
        let Some(track) = catalog.get(target) else {
            return;
        };
        self.last_ticket = self.last_ticket.next();
        let ticket = self.last_ticket;

        self.index = target;
        self.shuffle.sync(target);
        self.playing_ticket = None;
        self.in_flight = Some(PendingLoad {
            ticket,
            index: target,
            track_id: track.id.clone(),
        });
        self.status = PlayerStatus::Loading;
        debug!(?ticket, index = target, source = %track.source, "loading");
        self.device.load(ticket, &track.source);
    }

    /// Stop the device and drop any in-flight load.
    fn halt(&mut self) {
        let active = self.in_flight.is_some()
            || self.playing_ticket.is_some()
            || self.status == PlayerStatus::Paused;
        if active {
            self.device.stop();
        }
        self.in_flight = None;
        self.playing_ticket = None;
    }
}

/// The status to fall back to when nothing is loading or playing.
fn resting(catalog: &TrackCatalog, music: &MusicSettings) -> PlayerStatus {
    if !music.enabled || catalog.is_empty() {
        PlayerStatus::Idle
    } else {
        PlayerStatus::Stopped
    }
}
