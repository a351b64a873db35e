use super::*;
use crate::settings::RepeatMode;

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(std::io::Error::other("disk on fire").into())
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(std::io::Error::other("disk on fire").into())
    }
}

#[test]
fn parse_fills_missing_fields_with_defaults_and_ignores_unknown_ones() {
    let blob = r#"{
        "tracks": [{"id": "a", "title": "Anthem", "source": "/music/a.ogg", "mood": "epic"}],
        "music": {"volume": 0.3, "repeat": "one"},
        "schema": 99
    }"#;

    let s = Snapshot::parse(blob).unwrap();
    assert_eq!(s.tracks.len(), 1);
    assert_eq!(s.tracks[0].title, "Anthem");
    assert_eq!(s.tracks[0].artist, "");
    assert_eq!(s.tracks[0].duration_secs, 0);
    assert!(s.tracks[0].active);
    assert_eq!(s.music.volume, 0.3);
    assert_eq!(s.music.repeat, RepeatMode::One);
    assert!(s.music.enabled);
    assert_eq!(s.alerts, AlertSettings::default());
    assert_eq!(s.current_track_index, 0);
}

#[test]
fn parse_of_empty_object_is_the_default_snapshot() {
    assert_eq!(Snapshot::parse("{}").unwrap(), Snapshot::default());
}

#[test]
fn parse_rejects_malformed_json() {
    for blob in ["", "not json", "{\"tracks\": 5}", "[1, 2"] {
        assert!(
            matches!(Snapshot::parse(blob), Err(Error::Persistence(_))),
            "{blob:?} should fail"
        );
    }
}

#[test]
fn parse_rejects_duplicate_track_ids() {
    let blob = r#"{"tracks": [{"id": "a"}, {"id": "a"}]}"#;
    assert!(matches!(Snapshot::parse(blob), Err(Error::Persistence(_))));
}

#[test]
fn snapshot_json_carries_no_ephemeral_state() {
    let json = Snapshot::default().to_json().unwrap();
    assert!(!json.contains("is_playing"));
    assert!(!json.contains("is_loading"));
    assert!(json.contains("current_track_index"));
}

#[test]
fn save_skips_unchanged_snapshots() {
    let store = MemoryStore::default();
    let mut sync = PersistenceSync::new(Box::new(store.clone()), "state");

    let mut snapshot = Snapshot::default();
    assert!(sync.save(&snapshot));
    assert!(!sync.save(&snapshot));

    snapshot.current_track_index = 3;
    assert!(sync.save(&snapshot));
    let stored = store.get("state").unwrap().unwrap();
    assert_eq!(Snapshot::parse(&stored).unwrap().current_track_index, 3);
}

#[test]
fn save_failures_are_swallowed() {
    let mut sync = PersistenceSync::new(Box::new(BrokenStore), "state");
    assert!(!sync.save(&Snapshot::default()));
    assert!(sync.load().is_err());
}

#[test]
fn set_aside_copies_the_blob_next_to_the_live_key() {
    let mut store = MemoryStore::default();
    store.set("state", "{broken").unwrap();
    let mut sync = PersistenceSync::new(Box::new(store.clone()), "state");

    assert_eq!(sync.rejected_key(), "state.rejected");
    assert!(sync.set_aside("{broken"));
    assert_eq!(store.get("state").unwrap().as_deref(), Some("{broken"));
    assert_eq!(store.get("state.rejected").unwrap().as_deref(), Some("{broken"));

    let mut broken = PersistenceSync::new(Box::new(BrokenStore), "state");
    assert!(!broken.set_aside("{broken"));
}

#[test]
fn file_store_accepts_the_rejected_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut sync = PersistenceSync::new(Box::new(FileStore::new(dir.path())), "warbell-state");
    assert!(sync.set_aside("{broken"));
    assert!(dir.path().join("warbell-state.rejected.json").is_file());
}

#[test]
fn file_store_round_trips_and_reports_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("nested"));

    assert_eq!(store.get("state").unwrap(), None);
    store.set("state", "{\"a\":1}").unwrap();
    store.set("state", "{\"a\":2}").unwrap();
    assert_eq!(store.get("state").unwrap().as_deref(), Some("{\"a\":2}"));
    assert!(dir.path().join("nested").join("state.json").is_file());
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    assert!(store.set("../escape", "x").is_err());
    assert!(store.set("a/b", "x").is_err());
    assert!(store.get("").is_err());
}
