//! Playback device contract.
//!
//! A device turns a source locator into sound. Loading is asynchronous: the
//! device acknowledges `load` later with a [`DeviceEvent::Loaded`] carrying
//! the same [`LoadTicket`], and reports the natural end of a source with
//! [`DeviceEvent::Ended`]. The engine never blocks on a device.

mod output;
mod sink;

#[cfg(test)]
pub(crate) mod fake;

pub use output::RodioDevice;

/// Which logical output a device drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Music,
    Alert,
}

/// Identifies one `load` request so its completion can be matched up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

impl LoadTicket {
    /// The ticket following this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Notifications flowing back from a device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// A `load` finished: the source is playing, or it failed for an opaque reason.
    Loaded {
        channel: Channel,
        ticket: LoadTicket,
        result: Result<(), String>,
    },
    /// The source started by `ticket` played to its end.
    Ended { channel: Channel, ticket: LoadTicket },
}

pub trait PlaybackDevice {
    /// Load `source` and start it once ready. Replaces whatever was loaded.
    fn load(&mut self, ticket: LoadTicket, source: &str);
    /// Resume a paused source.
    fn resume(&mut self);
    fn pause(&mut self);
    /// Drop the current source.
    fn stop(&mut self);
    /// Set the output volume, already clamped to `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
}
