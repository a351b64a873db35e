use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::{AlertSettings, MusicSettings};

/// Top-level engine settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/warbell/config.toml` or `~/.config/warbell/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `WARBELL__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
///
/// The `music` and `alerts` sections only seed the records on a first run;
/// once a snapshot exists, the snapshot wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub storage: StorageSettings,
    pub music: MusicSettings,
    pub alerts: AlertSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Delay before auto-play kicks in (milliseconds). Some audio stacks
    /// refuse to start unprompted playback right at startup.
    pub autoplay_delay_ms: u64,
    /// Upper bound on how long the event loop sleeps between timer checks
    /// (milliseconds).
    pub tick_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            autoplay_delay_ms: 1000,
            tick_ms: 200,
        }
    }
}

impl EngineSettings {
    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the snapshot file. Defaults to the XDG state dir.
    pub state_dir: Option<PathBuf>,
    /// Key under which the snapshot is stored.
    pub snapshot_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            state_dir: None,
            snapshot_key: "warbell-state".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during import.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}
