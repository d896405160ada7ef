use super::*;
use crate::settings::model::BreathMode;

#[test]
fn persist_then_restore() {
    let mut store = InMemoryStore::new();
    let mut s = Settings::default();
    s.set_inhale_seconds(5.0);
    s.selected_preset_id = Some("whm".to_owned());
    s.persist(&mut store).unwrap();

    let back = Settings::restore(&store);
    assert_eq!(back, s);
    assert_eq!(back.mode, BreathMode::Seconds);
}

#[test]
fn restore_from_empty_store_is_default() {
    let store = InMemoryStore::new();
    assert_eq!(Settings::restore(&store), Settings::default());
}

#[test]
fn restore_from_corrupt_payload_is_default() {
    let mut store = InMemoryStore::new();
    store.set(SETTINGS_KEY, "{\"bpm\": \"fast\"".to_owned()).unwrap();
    assert_eq!(Settings::restore(&store), Settings::default());
}
