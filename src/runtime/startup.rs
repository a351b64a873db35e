use std::sync::mpsc::Sender;

use tracing::{info, warn};

use crate::config;
use crate::device::{Channel, RodioDevice};
use crate::orchestrator::{EngineOptions, Orchestrator};
use crate::persistence::{FileStore, KeyValueStore, MemoryStore};

use super::event_loop::LoopEvent;

/// Pick the snapshot store: files under the state dir when one is known,
/// otherwise an in-memory map that lives as long as the process.
fn open_store(settings: &config::Settings) -> Box<dyn KeyValueStore> {
    match settings.state_dir() {
        Some(dir) => {
            let store = FileStore::new(dir);
            info!(dir = %store.dir().display(), "snapshot store");
            Box::new(store)
        }
        None => {
            warn!("no state directory available, state will not survive a restart");
            Box::new(MemoryStore::default())
        }
    }
}

/// Wire both rodio outputs and the store into a fresh orchestrator.
pub fn build_orchestrator(settings: &config::Settings, tx: &Sender<LoopEvent>) -> Orchestrator {
    let music = RodioDevice::spawn(Channel::Music, tx.clone());
    let alerts = RodioDevice::spawn(Channel::Alert, tx.clone());
    Orchestrator::new(
        Box::new(music),
        Box::new(alerts),
        open_store(settings),
        EngineOptions::from(settings),
    )
}
