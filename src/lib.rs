//! warbell: a music playback and timed combat-alert engine.
//!
//! The [`Orchestrator`] owns the single authoritative playback state, the
//! track catalog, both settings records and the queue of self-expiring
//! alerts. It is driven by commands, by [`DeviceEvent`]s coming back from
//! the two playback devices, and by `tick(now)` for anything time based.

pub mod alerts;
pub mod config;
pub mod device;
pub mod error;
pub mod library;
pub mod orchestrator;
pub mod persistence;
pub mod playback;
pub mod runtime;
pub mod settings;

pub use alerts::{Alert, AlertId, CombatEvent};
pub use device::{Channel, DeviceEvent, LoadTicket, PlaybackDevice};
pub use error::{Error, Result};
pub use library::{Track, TrackCatalog};
pub use orchestrator::{EngineOptions, Orchestrator};
pub use playback::{PlaybackState, PlayerStatus};
pub use settings::{AlertSettings, MusicSettings, RepeatMode};
