//! Composition root.
//!
//! The orchestrator owns every component plus the two device handles, and is
//! the only public command surface. It is a plain single-threaded state
//! machine: each call runs to completion, time comes in as `now` arguments,
//! and device completions come back through [`Orchestrator::handle_device_event`].
//! After every committed change to the persisted subset a snapshot is written.

use std::path::Path;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alerts::{Alert, AlertId, AlertLifecycleManager, CombatEvent};
use crate::config::{self, LibrarySettings};
use crate::device::{Channel, DeviceEvent, PlaybackDevice};
use crate::error::{Error, Result};
use crate::library::{self, Track, TrackCatalog};
use crate::persistence::{KeyValueStore, PersistenceSync, Snapshot};
use crate::playback::{PlaybackController, PlaybackState, PlayerStatus};
use crate::settings::{
    AlertSettings, AlertSettingsUpdate, MusicSettings, MusicSettingsUpdate, SettingsStore,
};


/// Construction-time knobs.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub autoplay_delay: Duration,
    pub snapshot_key: String,
    /// Fixed shuffle seed; random when `None`.
    pub shuffle_seed: Option<u64>,
    /// Records used until a snapshot says otherwise.
    pub music: MusicSettings,
    pub alerts: AlertSettings,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            autoplay_delay: Duration::from_millis(1000),
            snapshot_key: "warbell-state".to_string(),
            shuffle_seed: None,
            music: MusicSettings::default(),
            alerts: AlertSettings::default(),
        }
    }
}

impl From<&config::Settings> for EngineOptions {
    fn from(settings: &config::Settings) -> Self {
        Self {
            autoplay_delay: settings.engine.autoplay_delay(),
            snapshot_key: settings.storage.snapshot_key.clone(),
            shuffle_seed: None,
            music: settings.music.clone(),
            alerts: settings.alerts.clone(),
        }
    }
}

pub struct Orchestrator {
    settings: SettingsStore,
    catalog: TrackCatalog,
    playback: PlaybackController,
    alerts: AlertLifecycleManager,
    persistence: PersistenceSync,
    autoplay_delay: Duration,
    autoplay_at: Option<Instant>,
}

impl Orchestrator {
    pub fn new(
        music_device: Box<dyn PlaybackDevice>,
        alert_device: Box<dyn PlaybackDevice>,
        store: Box<dyn KeyValueStore>,
        options: EngineOptions,
    ) -> Self {
        let rng = match options.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            settings: SettingsStore::new(options.music, options.alerts),
            catalog: TrackCatalog::default(),
            playback: PlaybackController::new(music_device, rng),
            alerts: AlertLifecycleManager::new(alert_device),
            persistence: PersistenceSync::new(store, options.snapshot_key),
            autoplay_delay: options.autoplay_delay,
            autoplay_at: None,
        }
    }

    /// Restore the stored snapshot (if any), push volumes to the device and
    /// schedule auto-play.
    ///
    /// Only a fresh start writes a snapshot here. A blob that fails to restore
    /// is copied to the rejected key and the live key is left alone.
    pub fn start(&mut self, now: Instant) {
        let restored = match self.persistence.load() {
            Ok(Some(blob)) => match self.restore(&blob) {
                Ok(()) => {
                    info!(tracks = self.catalog.len(), "restored snapshot");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable snapshot");
                    self.persistence.set_aside(&blob);
                    false
                }
            },
            Ok(None) => {
                info!("no snapshot yet; starting fresh");
                self.persist();
                false
            }
            Err(e) => {
                warn!(error = %e, "failed to read snapshot");
                false
            }
        };
        if !restored {
            self.playback
                .reset(&self.catalog, self.settings.music(), 0);
        }

        self.schedule_autoplay(now);
    }

    // ----- queries -----

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn music_settings(&self) -> &MusicSettings {
        self.settings.music()
    }

    pub fn alert_settings(&self) -> &AlertSettings {
        self.settings.alerts()
    }

    pub fn tracks(&self) -> &[Track] {
        self.catalog.list()
    }

    pub fn find_track(&self, id: &str) -> Option<&Track> {
        self.catalog.find(id)
    }

    /// The track at the current index, if the catalog is not empty.
    pub fn current_track(&self) -> Option<&Track> {
        self.catalog.get(self.playback.current_index())
    }

    pub fn alerts(&self) -> &[Alert] {
        self.alerts.alerts()
    }

    /// When `tick` next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.autoplay_at, self.alerts.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ----- settings -----

    pub fn update_music_settings(&mut self, update: MusicSettingsUpdate) -> Result<()> {
        let old = self.settings.music().clone();
        if self.settings.update_music(update)? {
            self.playback
                .on_settings_changed(&self.catalog, &old, self.settings.music());
            if !self.settings.music().enabled {
                self.autoplay_at = None;
            }
            self.persist();
        }
        Ok(())
    }

    pub fn update_alert_settings(&mut self, update: AlertSettingsUpdate) -> Result<()> {
        if self.settings.update_alerts(update)? {
            if !self.settings.alerts().enabled {
                let n = self.alerts.clear();
                if n > 0 {
                    info!(cleared = n, "alerts disabled");
                }
            }
            self.persist();
        }
        Ok(())
    }

    // ----- catalog -----

    pub fn add_track(&mut self, track: Track, now: Instant) -> Result<()> {
        let was_empty = self.catalog.is_empty();
        self.insert(track)?;
        if was_empty {
            self.schedule_autoplay(now);
        }
        self.persist();
        Ok(())
    }

    pub fn remove_track(&mut self, id: &str) -> Option<Track> {
        let (pos, track) = self.catalog.remove(id)?;
        self.playback
            .on_track_removed(&self.catalog, self.settings.music(), pos);
        if self.catalog.is_empty() {
            self.autoplay_at = None;
        }
        info!(id, title = %track.title, "track removed");
        self.persist();
        Some(track)
    }

    /// Swap in a new definition for an existing id: remove, then add.
    /// Replacing the only track counts as the catalog filling up again.
    pub fn replace_track(&mut self, track: Track, now: Instant) -> Result<()> {
        let Some((pos, _old)) = self.catalog.remove(&track.id) else {
            return Err(Error::NotFound(track.id));
        };
        self.playback
            .on_track_removed(&self.catalog, self.settings.music(), pos);
        let emptied = self.catalog.is_empty();
        self.insert(track)?;
        if emptied {
            self.schedule_autoplay(now);
        }
        self.persist();
        Ok(())
    }

    /// Add every audio file under `dir` not already in the catalog.
    /// Returns how many tracks were added.
    pub fn import_directory(
        &mut self,
        dir: &Path,
        settings: &LibrarySettings,
        now: Instant,
    ) -> usize {
        let was_empty = self.catalog.is_empty();
        let mut added = 0;
        for track in library::scan(dir, settings) {
            if self.catalog.contains_source(&track.source) {
                continue;
            }
            match self.insert(track) {
                Ok(()) => added += 1,
                Err(e) => warn!(error = %e, "skipping imported track"),
            }
        }
        info!(dir = %dir.display(), added, "import finished");
        if was_empty && added > 0 {
            self.schedule_autoplay(now);
        }
        self.persist();
        added
    }

    // ----- playback -----

    pub fn play(&mut self, index: Option<usize>) -> bool {
        let accepted = self
            .playback
            .play(&self.catalog, self.settings.music(), index);
        self.persist();
        accepted
    }

    pub fn pause(&mut self) -> bool {
        self.playback.pause()
    }

    pub fn stop(&mut self) {
        self.playback.stop(&self.catalog, self.settings.music());
    }

    pub fn next(&mut self) -> bool {
        let accepted = self.playback.next(&self.catalog, self.settings.music());
        self.persist();
        accepted
    }

    pub fn previous(&mut self) -> bool {
        let accepted = self
            .playback
            .previous(&self.catalog, self.settings.music());
        self.persist();
        accepted
    }

    /// Feed a device notification back into the engine.
    ///
    /// A music load failure comes back as `Err(Error::Device)` so the caller
    /// can surface it; the engine itself is already back to `Stopped`.
    pub fn handle_device_event(&mut self, event: DeviceEvent) -> Result<()> {
        match event {
            DeviceEvent::Loaded {
                channel: Channel::Music,
                ticket,
                result,
            } => {
                let outcome = self.playback.on_load_finished(
                    &self.catalog,
                    self.settings.music(),
                    ticket,
                    result,
                );
                self.persist();
                outcome
            }
            DeviceEvent::Ended {
                channel: Channel::Music,
                ticket,
            } => {
                self.playback
                    .on_track_ended(&self.catalog, self.settings.music(), ticket);
                self.persist();
                Ok(())
            }
            DeviceEvent::Loaded {
                channel: Channel::Alert,
                ticket,
                result,
            } => {
                self.alerts.on_sound_loaded(ticket, result);
                Ok(())
            }
            DeviceEvent::Ended {
                channel: Channel::Alert,
                ..
            } => Ok(()),
        }
    }

    // ----- alerts -----

    /// Turn a combat event into an alert. `None` when alerts are off or silent.
    pub fn on_combat(&mut self, event: CombatEvent, now: Instant) -> Option<AlertId> {
        self.alerts.raise(event, self.settings.alerts(), now)
    }

    pub fn dismiss_alert(&mut self, id: AlertId) -> bool {
        self.alerts.dismiss(id)
    }

    /// Run everything due at `now`: the deferred auto-play and alert expiry.
    /// Returns the alerts that expired.
    pub fn tick(&mut self, now: Instant) -> Vec<Alert> {
        if self.autoplay_at.is_some_and(|at| at <= now) {
            self.autoplay_at = None;
            let music = self.settings.music();
            if music.enabled && music.auto_play && self.playback.status() == PlayerStatus::Stopped {
                debug!("auto-play");
                self.play(None);
            }
        }
        self.alerts.expire(now)
    }

    // ----- persistence -----

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tracks: self.catalog.list().to_vec(),
            music: self.settings.music().clone(),
            alerts: self.settings.alerts().clone(),
            current_track_index: self.playback.current_index(),
        }
    }

    /// Replace the persisted subset with a snapshot blob. All or nothing:
    /// on error nothing in memory has changed.
    pub fn restore(&mut self, blob: &str) -> Result<()> {
        let snapshot = Snapshot::parse(blob)?;
        let tracks = snapshot
            .tracks
            .into_iter()
            .map(|t| {
                if t.id.is_empty() {
                    t.with_id(Uuid::new_v4().to_string())
                } else {
                    t
                }
            })
            .collect();
        let catalog =
            TrackCatalog::from_tracks(tracks).map_err(|e| Error::Persistence(e.to_string()))?;

        self.settings.replace(snapshot.music, snapshot.alerts);
        self.catalog = catalog;
        if !self.settings.alerts().enabled {
            self.alerts.clear();
        }
        self.autoplay_at = None;
        self.playback.reset(
            &self.catalog,
            self.settings.music(),
            snapshot.current_track_index,
        );
        self.persistence.mark_written(blob.to_string());
        self.persist();
        Ok(())
    }

    fn insert(&mut self, track: Track) -> Result<()> {
        let title = track.title.clone();
        self.catalog.add(track)?;
        self.playback.on_track_added(&self.catalog, self.settings.music());
        debug!(%title, "track added");
        Ok(())
    }

    fn schedule_autoplay(&mut self, now: Instant) {
        let music = self.settings.music();
        if music.enabled && music.auto_play && !self.catalog.is_empty() {
            self.autoplay_at = Some(now + self.autoplay_delay);
        }
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        self.persistence.save(&snapshot);
    }
}
