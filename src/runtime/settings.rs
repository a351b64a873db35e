use tracing::warn;

use crate::config;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                warn!(%msg, "invalid config, using defaults");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the engine from starting.
            warn!(error = %e, "failed to load config, using defaults");
            config::Settings::default()
        }
    }
}
