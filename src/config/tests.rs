use super::load::{default_config_path, default_state_dir, resolve_config_path};
use super::schema::*;
use crate::settings::RepeatMode;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_warbell_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("WARBELL_CONFIG_PATH", "/tmp/warbell-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/warbell-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("warbell")
            .join("config.toml")
    );
}

#[test]
fn default_state_dir_falls_back_to_home_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_state_dir().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".local")
            .join("state")
            .join("warbell")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[engine]
autoplay_delay_ms = 0
tick_ms = 50

[storage]
state_dir = "/tmp/warbell-state"
snapshot_key = "campaign-7"

[music]
auto_play = false
volume = 0.25
repeat = "repeat-one"

[alerts]
sound = "/sounds/horn.ogg"
duration_secs = 12

[library]
extensions = ["ogg"]
recursive = false
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("WARBELL_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("WARBELL__ENGINE__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.engine.autoplay_delay_ms, 0);
    assert_eq!(s.engine.tick_ms, 50);
    assert_eq!(s.state_dir().unwrap(), std::path::PathBuf::from("/tmp/warbell-state"));
    assert_eq!(s.storage.snapshot_key, "campaign-7");
    assert!(!s.music.auto_play);
    assert!(s.music.enabled);
    assert_eq!(s.music.volume, 0.25);
    assert_eq!(s.music.repeat, RepeatMode::One);
    assert_eq!(s.alerts.sound.as_deref(), Some("/sounds/horn.ogg"));
    assert_eq!(s.alerts.duration_secs, 12);
    assert_eq!(s.library.extensions, vec!["ogg".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[engine]
tick_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("WARBELL_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("WARBELL__ENGINE__TICK_MS", "75");

    let s = Settings::load().unwrap();
    assert_eq!(s.engine.tick_ms, 75);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.engine.tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.music.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.alerts.duration_secs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn default_settings_render_as_toml() {
    let rendered = toml::to_string_pretty(&Settings::default()).unwrap();
    assert!(rendered.contains("[engine]"));
    assert!(rendered.contains("autoplay_delay_ms = 1000"));
    assert!(rendered.contains("repeat = \"all\""));
}
