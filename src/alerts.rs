//! Alert lifecycle: the queue of active combat alerts and their expiry.
//!
//! Every queued alert owns exactly one entry in the timer table. Removal by
//! any path (dismissal, expiry, clearing) takes that entry out in the same
//! step, so a timer never fires for an alert that is gone.

mod model;
mod timers;

pub use model::{Alert, AlertId, CombatEvent};

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::device::{LoadTicket, PlaybackDevice};
use crate::settings::AlertSettings;

use timers::TimerTable;

#[cfg(test)]
mod tests;

/// Longest an alert stays queued without being dismissed.
pub const MAX_ALERT_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

pub struct AlertLifecycleManager {
    device: Box<dyn PlaybackDevice>,
    queue: Vec<Alert>,
    timers: TimerTable,
    last_id: u64,
    last_ticket: LoadTicket,
}

impl AlertLifecycleManager {
    pub fn new(device: Box<dyn PlaybackDevice>) -> Self {
        Self {
            device,
            queue: Vec::new(),
            timers: TimerTable::default(),
            last_id: 0,
            last_ticket: LoadTicket(0),
        }
    }

    /// Active alerts in insertion order.
    pub fn alerts(&self) -> &[Alert] {
        &self.queue
    }

    /// Queue an alert for `event`, sound it, and schedule its expiry.
    ///
    /// Returns `None` (and does nothing) when alerts are disabled or no
    /// sound is configured.
    pub fn raise(
        &mut self,
        event: CombatEvent,
        settings: &AlertSettings,
        now: Instant,
    ) -> Option<AlertId> {
        if !settings.enabled {
            debug!("alerts disabled; ignoring combat event");
            return None;
        }
        let Some(sound) = settings.sound_locator() else {
            debug!("no alert sound configured; ignoring combat event");
            return None;
        };

        self.last_id += 1;
        let id = AlertId(self.last_id);
        let alert = Alert {
            id,
            attacker: event.attacker,
            defender: event.defender,
            timestamp: event.timestamp,
            active: true,
        };
        info!(%id, message = %alert.message(), "alert raised");
        self.queue.push(alert);

        let lifetime = Duration::from_secs(settings.duration_secs.max(1)).min(MAX_ALERT_LIFETIME);
        let deadline = now.checked_add(lifetime).unwrap_or(now);
        self.timers.schedule(id, deadline);

        self.last_ticket = self.last_ticket.next();
        self.device.set_volume(settings.volume);
        self.device.load(self.last_ticket, sound);

        Some(id)
    }

    /// Remove `id` now and cancel its timer. Unknown ids are a no-op.
    pub fn dismiss(&mut self, id: AlertId) -> bool {
        let Some(alert) = self.take(id) else {
            return false;
        };
        let cancelled = self.timers.cancel(id);
        debug_assert!(cancelled, "queued alert {id} had no timer");
        debug!(%id, message = %alert.message(), "alert dismissed");
        true
    }

    /// Fire every timer due at `now`, removing the alerts they belong to.
    pub fn expire(&mut self, now: Instant) -> Vec<Alert> {
        let mut expired = Vec::new();
        for id in self.timers.take_expired(now) {
            if let Some(alert) = self.take(id) {
                debug!(%id, "alert expired");
                expired.push(alert);
            }
        }
        expired
    }

    /// Drop every alert and its timer. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.timers.clear();
        if n > 0 {
            self.device.stop();
        }
        n
    }

    /// Earliest pending expiry, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Handle a `Loaded` event from the alert device. Failures are only logged.
    pub fn on_sound_loaded(&mut self, ticket: LoadTicket, result: Result<(), String>) {
        if let Err(reason) = result {
            warn!(?ticket, %reason, "alert sound failed to play");
        }
    }

    fn take(&mut self, id: AlertId) -> Option<Alert> {
        let pos = self.queue.iter().position(|a| a.id == id)?;
        let mut alert = self.queue.remove(pos);
        alert.active = false;
        Some(alert)
    }

    #[cfg(test)]
    fn timers(&self) -> &TimerTable {
        &self.timers
    }
}
