//! Music and alert configuration records.
//!
//! Both records are always present and defaulted. They are deserialized from
//! snapshots and from the `[music]` / `[alerts]` config sections, so every
//! field falls back to its default when missing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Stop at the ends of the catalog.
    #[serde(alias = "no-loop", alias = "no_loop", alias = "off")]
    None,
    /// Replay the current track when it ends.
    #[serde(alias = "repeat-one", alias = "loop-one", alias = "loop_one")]
    One,
    /// Wrap around at both ends of the catalog.
    #[serde(alias = "repeat-all", alias = "loop-all", alias = "loop_all")]
    All,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::All
    }
}

impl FromStr for RepeatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "no-loop" | "no_loop" => Ok(Self::None),
            "one" | "repeat-one" | "loop-one" | "loop_one" => Ok(Self::One),
            "all" | "repeat-all" | "loop-all" | "loop_all" => Ok(Self::All),
            other => Err(Error::Validation(format!("unknown repeat mode {other:?}"))),
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::One => "one",
            Self::All => "all",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicSettings {
    /// Master switch for the music subsystem.
    pub enabled: bool,
    /// Start playing on startup and when the catalog stops being empty.
    pub auto_play: bool,
    /// Music channel volume in `[0, 1]`.
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_play: true,
            volume: 0.5,
            shuffle: false,
            repeat: RepeatMode::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub enabled: bool,
    /// Locator of the sound played when an alert is raised.
    /// Alerts are not raised at all while this is unset.
    pub sound: Option<String>,
    /// Alert channel volume in `[0, 1]`.
    pub volume: f32,
    /// Whether a host UI should render the alert banner.
    pub show_visual: bool,
    /// Lifetime of an alert in seconds. At least 1; 30 is the
    /// recommended ceiling but is not enforced here.
    pub duration_secs: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: None,
            volume: 0.7,
            show_visual: true,
            duration_secs: 5,
        }
    }
}

impl AlertSettings {
    /// The configured sound, if it is set to something non-blank.
    pub fn sound_locator(&self) -> Option<&str> {
        self.sound.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Partial update for [`MusicSettings`]; `None` fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct MusicSettingsUpdate {
    pub enabled: Option<bool>,
    pub auto_play: Option<bool>,
    pub volume: Option<f32>,
    pub shuffle: Option<bool>,
    pub repeat: Option<RepeatMode>,
}

/// Partial update for [`AlertSettings`]; `None` fields are left as-is.
///
/// `sound: Some(None)` clears the configured sound.
#[derive(Debug, Clone, Default)]
pub struct AlertSettingsUpdate {
    pub enabled: Option<bool>,
    pub sound: Option<Option<String>>,
    pub volume: Option<f32>,
    pub show_visual: Option<bool>,
    pub duration_secs: Option<u64>,
}
