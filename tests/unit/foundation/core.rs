use super::*;
use serde_json::json;

#[test]
fn millis_differences() {
    let a = Millis(1_000.0);
    let b = a.offset(250.0);
    assert_eq!(b.since(a), 250.0);
    assert_eq!(a.since(b), -250.0);
    assert_eq!(Millis::from_secs(1.5), Millis(1_500.0));
}

#[test]
fn canvas_emptiness() {
    assert!(Canvas::new(0, 100).is_empty());
    assert!(Canvas::default().is_empty());
    assert!(!Canvas::new(300, 120).is_empty());
}

#[test]
fn json_number_accepts_numeric_strings() {
    assert_eq!(json_number(&json!(4)), Some(4.0));
    assert_eq!(json_number(&json!(" 2.5 ")), Some(2.5));
    assert_eq!(json_number(&json!("until_tap")), None);
    assert_eq!(json_number(&json!(null)), None);
    assert_eq!(json_number(&json!(true)), None);
}

#[test]
fn non_negative_secs_rejects_bad_values() {
    assert_eq!(non_negative_secs("hold", 0.0).unwrap(), 0.0);
    assert!(non_negative_secs("hold", -0.1).is_err());
    assert!(non_negative_secs("hold", f64::NAN).is_err());
    assert!(non_negative_secs("hold", f64::INFINITY).is_err());
}
