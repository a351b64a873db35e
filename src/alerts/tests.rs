use std::time::{Duration, Instant};

use super::*;
use crate::device::fake::{Call, FakeDevice};

fn settings() -> AlertSettings {
    AlertSettings {
        sound: Some("/sounds/horn.ogg".into()),
        duration_secs: 5,
        volume: 0.4,
        ..AlertSettings::default()
    }
}

fn manager() -> (AlertLifecycleManager, FakeDevice) {
    let dev = FakeDevice::default();
    (AlertLifecycleManager::new(Box::new(dev.clone())), dev)
}

fn assert_timers_match_queue(m: &AlertLifecycleManager) {
    assert_eq!(m.timers().len(), m.alerts().len());
    for a in m.alerts() {
        assert!(m.timers().contains(a.id), "alert {} has no timer", a.id);
    }
}

#[test]
fn raise_queues_alert_sounds_it_and_schedules_expiry() {
    let (mut m, dev) = manager();
    let now = Instant::now();

    let id = m
        .raise(CombatEvent::new("Gondor", "Mordor"), &settings(), now)
        .unwrap();

    assert_eq!(m.alerts().len(), 1);
    let a = &m.alerts()[0];
    assert_eq!(a.id, id);
    assert!(a.active);
    assert_eq!(a.message(), "Gondor attacked Mordor");
    assert_eq!(m.next_deadline(), Some(now + Duration::from_secs(5)));
    assert_eq!(
        dev.calls(),
        vec![
            Call::Volume(0.4),
            Call::Load(LoadTicket(1), "/sounds/horn.ogg".into())
        ]
    );
    assert_timers_match_queue(&m);
}

#[test]
fn raise_is_a_noop_when_disabled_or_without_sound() {
    let (mut m, dev) = manager();
    let now = Instant::now();

    let disabled = AlertSettings {
        enabled: false,
        ..settings()
    };
    assert!(m.raise(CombatEvent::new("A", "B"), &disabled, now).is_none());

    let silent = AlertSettings {
        sound: None,
        ..settings()
    };
    assert!(m.raise(CombatEvent::new("A", "B"), &silent, now).is_none());

    assert!(m.alerts().is_empty());
    assert!(m.next_deadline().is_none());
    assert!(dev.calls().is_empty());
}

#[test]
fn alert_expires_after_its_duration() {
    let (mut m, _dev) = manager();
    let now = Instant::now();
    let id = m.raise(CombatEvent::new("A", "B"), &settings(), now).unwrap();

    assert!(m.expire(now + Duration::from_secs(4)).is_empty());
    assert_eq!(m.alerts().len(), 1);

    let expired = m.expire(now + Duration::from_secs(5));
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, id);
    assert!(!expired[0].active);
    assert!(m.alerts().is_empty());
    assert!(m.next_deadline().is_none());
}

#[test]
fn dismiss_removes_immediately_and_prevents_later_expiry() {
    let (mut m, _dev) = manager();
    let now = Instant::now();
    let id = m.raise(CombatEvent::new("A", "B"), &settings(), now).unwrap();

    assert!(m.dismiss(id));
    assert!(m.alerts().is_empty());
    assert!(m.next_deadline().is_none());

    assert!(m.expire(now + Duration::from_secs(60)).is_empty());
    // Dismissing again is a quiet no-op.
    assert!(!m.dismiss(id));
}

#[test]
fn identical_alerts_are_independent() {
    let (mut m, _dev) = manager();
    let now = Instant::now();
    let first = m.raise(CombatEvent::new("A", "B"), &settings(), now).unwrap();
    let later = now + Duration::from_secs(2);
    let second = m.raise(CombatEvent::new("A", "B"), &settings(), later).unwrap();
    assert_ne!(first, second);
    assert_eq!(m.alerts().len(), 2);

    let expired = m.expire(now + Duration::from_secs(5));
    assert_eq!(expired.iter().map(|a| a.id).collect::<Vec<_>>(), vec![first]);
    assert_eq!(m.alerts()[0].id, second);
    assert_eq!(m.next_deadline(), Some(later + Duration::from_secs(5)));
    assert_timers_match_queue(&m);
}

#[test]
fn queue_keeps_insertion_order() {
    let (mut m, _dev) = manager();
    let now = Instant::now();
    for name in ["North", "South", "East"] {
        m.raise(CombatEvent::new(name, "West"), &settings(), now);
    }
    let attackers: Vec<&str> = m.alerts().iter().map(|a| a.attacker.as_str()).collect();
    assert_eq!(attackers, vec!["North", "South", "East"]);

    let middle = m.alerts()[1].id;
    m.dismiss(middle);
    let attackers: Vec<&str> = m.alerts().iter().map(|a| a.attacker.as_str()).collect();
    assert_eq!(attackers, vec!["North", "East"]);
    assert_timers_match_queue(&m);
}

#[test]
fn clear_drops_every_alert_and_timer() {
    let (mut m, dev) = manager();
    let now = Instant::now();
    m.raise(CombatEvent::new("A", "B"), &settings(), now);
    m.raise(CombatEvent::new("C", "D"), &settings(), now);

    assert_eq!(m.clear(), 2);
    assert!(m.alerts().is_empty());
    assert!(m.next_deadline().is_none());
    assert_eq!(dev.calls().last(), Some(&Call::Stop));
    assert_eq!(m.clear(), 0);
}

#[test]
fn timers_track_the_queue_through_mixed_removals() {
    let (mut m, _dev) = manager();
    let t0 = Instant::now();
    let mut ids = Vec::new();
    for i in 0..6u64 {
        let s = AlertSettings {
            duration_secs: 1 + i,
            ..settings()
        };
        ids.push(m.raise(CombatEvent::new("A", "B"), &s, t0).unwrap());
    }

    m.dismiss(ids[1]);
    m.dismiss(ids[4]);
    let expired = m.expire(t0 + Duration::from_secs(3));
    assert_eq!(
        expired.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![ids[0], ids[2]]
    );
    assert_timers_match_queue(&m);

    let rest = m.expire(t0 + Duration::from_secs(100));
    assert_eq!(rest.iter().map(|a| a.id).collect::<Vec<_>>(), vec![ids[3], ids[5]]);
    assert!(m.alerts().is_empty());
    assert_timers_match_queue(&m);
}

#[test]
fn huge_duration_is_capped_instead_of_overflowing() {
    let (mut m, _dev) = manager();
    let t0 = Instant::now();
    let forever = AlertSettings {
        duration_secs: u64::MAX,
        ..settings()
    };

    let id = m.raise(CombatEvent::new("Rome", "Carthage"), &forever, t0).unwrap();

    assert_eq!(m.next_deadline(), Some(t0 + MAX_ALERT_LIFETIME));
    assert!(m.expire(t0 + Duration::from_secs(24 * 60 * 60)).is_empty());
    assert_eq!(m.alerts()[0].id, id);
    assert_timers_match_queue(&m);

    assert!(m.dismiss(id));
    assert!(m.next_deadline().is_none());
}
