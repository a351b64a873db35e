use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(pub u64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlertId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Inbound "combat occurred" event from the game simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEvent {
    pub attacker: String,
    pub defender: String,
    pub timestamp: DateTime<Utc>,
}

impl CombatEvent {
    pub fn new(attacker: impl Into<String>, defender: impl Into<String>) -> Self {
        Self {
            attacker: attacker.into(),
            defender: defender.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A queued, self-expiring notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: AlertId,
    pub attacker: String,
    pub defender: String,
    pub timestamp: DateTime<Utc>,
    /// True while the alert sits in the queue.
    pub active: bool,
}

impl Alert {
    pub fn message(&self) -> String {
        format!("{} attacked {}", self.attacker, self.defender)
    }
}
