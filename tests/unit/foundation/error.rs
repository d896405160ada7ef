use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BreathError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BreathError::session("x")
            .to_string()
            .contains("session error:")
    );
    assert!(
        BreathError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("speaker unplugged");
    let err = BreathError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("speaker unplugged"));
}
