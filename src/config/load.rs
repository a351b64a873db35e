use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then layers environment
/// variables (prefix `WARBELL__`) on top, falling back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("WARBELL")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.engine.tick_ms == 0 {
            return Err("engine.tick_ms must be >= 1".to_string());
        }
        if self.storage.snapshot_key.trim().is_empty() {
            return Err("storage.snapshot_key must not be empty".to_string());
        }
        if self.alerts.duration_secs == 0 {
            return Err("alerts.duration_secs must be >= 1".to_string());
        }
        for (name, v) in [("music.volume", self.music.volume), ("alerts.volume", self.alerts.volume)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("{name} must be within [0, 1], got {v}"));
            }
        }
        Ok(())
    }

    /// Directory the snapshot store writes into.
    pub fn state_dir(&self) -> Option<PathBuf> {
        self.storage.state_dir.clone().or_else(default_state_dir)
    }
}

/// Resolve the config path from `WARBELL_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("WARBELL_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/warbell/config.toml`
/// or `~/.config/warbell/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join("warbell").join("config.toml"))
}

/// Compute the default state directory: `$XDG_STATE_HOME/warbell` or
/// `~/.local/state/warbell`.
pub fn default_state_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"]).map(|d| d.join("warbell"))
}

fn xdg_dir(var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        let mut p = PathBuf::from(home);
        p.extend(home_fallback);
        Some(p)
    } else {
        None
    }
}
