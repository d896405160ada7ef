use super::*;

const ALL: [Ease; 4] = [Ease::Linear, Ease::InOutSine, Ease::InOutQuad, Ease::InOutCubic];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert!(ease.apply(0.0).abs() < 1e-12);
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn sine_is_symmetric_around_midpoint() {
    let e = Ease::InOutSine;
    assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((e.apply(0.2) + e.apply(0.8) - 1.0).abs() < 1e-12);
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InOutSine.apply(-3.0), Ease::InOutSine.apply(0.0));
    assert_eq!(Ease::InOutCubic.apply(7.0), 1.0);
}

#[test]
fn default_is_sine() {
    assert_eq!(Ease::default(), Ease::InOutSine);
}
