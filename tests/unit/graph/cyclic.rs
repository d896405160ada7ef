use super::*;

fn boxed() -> PhaseDurations {
    PhaseDurations {
        inhale: 4.0,
        hold_inhale: 2.0,
        exhale: 6.0,
        hold_exhale: 3.0,
    }
}

#[test]
fn shape_over_one_cycle() {
    let d = boxed();
    let ease = Ease::InOutSine;
    assert_eq!(breath_value_at(0.0, &d, ease), 0.0);

    let mut prev = 0.0;
    for i in 1..=40 {
        let v = breath_value_at(4.0 * f64::from(i) / 40.0 - 1e-9, &d, ease);
        assert!(v >= prev - 1e-12);
        prev = v;
    }
    assert!((breath_value_at(4.0 - 1e-9, &d, ease) - 1.0).abs() < 1e-6);
    assert_eq!(breath_value_at(4.0, &d, ease), 1.0);
    assert_eq!(breath_value_at(5.9, &d, ease), 1.0);

    let mut prev = 1.0;
    for i in 0..=40 {
        let v = breath_value_at(6.0 + 6.0 * f64::from(i) / 40.0 - 1e-9, &d, ease);
        assert!(v <= prev + 1e-12);
        prev = v;
    }
    assert_eq!(breath_value_at(12.0, &d, ease), 0.0);
    assert_eq!(breath_value_at(14.9, &d, ease), 0.0);
}

#[test]
fn periodic_including_negative_time() {
    let d = boxed();
    for t in [0.3, 2.0, 5.0, 7.7, 13.0] {
        let v = breath_value_at(t, &d, Ease::InOutSine);
        assert!((breath_value_at(t + 15.0, &d, Ease::InOutSine) - v).abs() < 1e-9);
        assert!((breath_value_at(t - 30.0, &d, Ease::InOutSine) - v).abs() < 1e-9);
    }
}

#[test]
fn degenerate_cycle_reads_zero() {
    let d = PhaseDurations::default();
    assert_eq!(breath_value_at(3.0, &d, Ease::Linear), 0.0);
    assert_eq!(breath_value_at(f64::NAN, &boxed(), Ease::Linear), 0.0);
}
