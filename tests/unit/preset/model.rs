use super::*;

const YAML: &str = r#"
presets:
  - id: box
    label: Box
    category: Calm
    inhale: 4
    holdInhale: 4
    exhale: 4
    holdExhale: 4
  - id: coherent
    mode: bpm
    inhale: 5
    exhale: 5
  - id: whm
    label: Wim Hof
    category: Calm
    configurable:
      - repeat|n
      - path: repeat|steps|breaths|repeat|n
        label: Breaths
    steps:
      - repeat:
          n: 3
          steps:
            - hold: until_tap
"#;

#[test]
fn yaml_library_parses_and_classifies() {
    let lib = PresetLibrary::from_yaml_str(YAML).unwrap();
    assert_eq!(lib.presets.len(), 3);

    let box_ = lib.find("box").unwrap();
    match box_.kind() {
        PresetKind::Simple(r) => {
            assert_eq!(r.total(), 16.0);
            assert_eq!(r.mode, None);
        }
        PresetKind::Composable => panic!("box is simple"),
    }

    let coherent = lib.find("coherent").unwrap();
    assert_eq!(coherent.display_label(), "coherent");
    match coherent.kind() {
        PresetKind::Simple(r) => {
            assert_eq!(r.mode, Some(BreathMode::Bpm));
            assert_eq!(r.hold_inhale, 0.0);
        }
        PresetKind::Composable => panic!("coherent is simple"),
    }

    let whm = lib.find("whm").unwrap();
    assert_eq!(whm.kind(), PresetKind::Composable);
    let entries = whm.configurable_entries();
    assert_eq!(entries[0].path, "repeat|n");
    assert_eq!(entries[0].label, None);
    assert_eq!(entries[1].label.as_deref(), Some("Breaths"));
    assert!(lib.find("nope").is_none());
}

#[test]
fn categories_keep_first_seen_order() {
    let lib = PresetLibrary::from_yaml_str(YAML).unwrap();
    let groups = lib.by_category();
    let names: Vec<_> = groups.iter().map(|(c, _)| *c).collect();
    assert_eq!(names, ["Calm", DEFAULT_CATEGORY]);
    assert_eq!(groups[0].1.len(), 2);
}

#[test]
fn json_library_parses() {
    let lib = PresetLibrary::from_json_str(
        r#"{"presets":[{"id":"a","inhale":3,"exhale":3,"steps":[{"inhale":2}]}]}"#,
    )
    .unwrap();
    assert_eq!(lib.presets[0].kind(), PresetKind::Composable);
}

#[test]
fn bad_json_is_a_serde_error() {
    let err = PresetLibrary::from_json_str("{").unwrap_err();
    assert!(matches!(err, BreathError::Serde(_)));
}

#[test]
fn raw_value_round_trip_keeps_steps() {
    let lib = PresetLibrary::from_yaml_str(YAML).unwrap();
    let whm = lib.find("whm").unwrap();
    let v = whm.to_value().unwrap();
    assert!(v.get("inhale").is_none());
    assert_eq!(v["steps"][0]["repeat"]["n"], 3);
    let back = PresetDef::from_value(v).unwrap();
    assert_eq!(&back, whm);
}
