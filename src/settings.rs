//! Settings store: the music and alert configuration records.
//!
//! Updates are merged field by field into a copy of the current record and
//! only committed once every field validated, so a failed update never
//! leaves a partially applied record behind.

mod model;

pub use model::*;

use crate::error::{Error, Result};


/// Clamp a volume into `[0, 1]`, rejecting NaN and infinities.
pub fn clamp_volume(v: f32) -> Result<f32> {
    if !v.is_finite() {
        return Err(Error::Validation(format!("volume must be a finite number, got {v}")));
    }
    Ok(v.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    music: MusicSettings,
    alerts: AlertSettings,
}

impl SettingsStore {
    /// Build a store from initial records, normalizing their numeric ranges.
    pub fn new(music: MusicSettings, alerts: AlertSettings) -> Self {
        Self {
            music: normalize_music(music),
            alerts: normalize_alerts(alerts),
        }
    }

    pub fn music(&self) -> &MusicSettings {
        &self.music
    }

    pub fn alerts(&self) -> &AlertSettings {
        &self.alerts
    }

    /// Merge `update` into the music record. Returns whether anything changed.
    pub fn update_music(&mut self, update: MusicSettingsUpdate) -> Result<bool> {
        let mut next = self.music.clone();
        if let Some(v) = update.enabled {
            next.enabled = v;
        }
        if let Some(v) = update.auto_play {
            next.auto_play = v;
        }
        if let Some(v) = update.volume {
            next.volume = clamp_volume(v)?;
        }
        if let Some(v) = update.shuffle {
            next.shuffle = v;
        }
        if let Some(v) = update.repeat {
            next.repeat = v;
        }

        let changed = next != self.music;
        self.music = next;
        Ok(changed)
    }

    /// Merge `update` into the alert record. Returns whether anything changed.
    pub fn update_alerts(&mut self, update: AlertSettingsUpdate) -> Result<bool> {
        let mut next = self.alerts.clone();
        if let Some(v) = update.enabled {
            next.enabled = v;
        }
        if let Some(v) = update.sound {
            next.sound = v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Some(v) = update.volume {
            next.volume = clamp_volume(v)?;
        }
        if let Some(v) = update.show_visual {
            next.show_visual = v;
        }
        if let Some(v) = update.duration_secs {
            if v == 0 {
                return Err(Error::Validation(
                    "alert duration must be at least 1 second".to_string(),
                ));
            }
            next.duration_secs = v;
        }

        let changed = next != self.alerts;
        self.alerts = next;
        Ok(changed)
    }

    /// Replace both records wholesale (used by snapshot restore).
    pub(crate) fn replace(&mut self, music: MusicSettings, alerts: AlertSettings) {
        self.music = normalize_music(music);
        self.alerts = normalize_alerts(alerts);
    }
}

fn normalize_music(mut music: MusicSettings) -> MusicSettings {
    music.volume = clamp_volume(music.volume).unwrap_or(MusicSettings::default().volume);
    music
}

fn normalize_alerts(mut alerts: AlertSettings) -> AlertSettings {
    alerts.volume = clamp_volume(alerts.volume).unwrap_or(AlertSettings::default().volume);
    alerts.duration_secs = alerts.duration_secs.max(1);
    alerts.sound = alerts.sound_locator().map(str::to_string);
    alerts
}
