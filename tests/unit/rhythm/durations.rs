use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn six_bpm_one_point_five_ratio() {
    let split = calculate_durations_from_bpm_ratio(6.0, 1.5, 0.0, 0.0);
    assert!(close(split.inhale, 4.0));
    assert!(close(split.exhale, 6.0));
}

#[test]
fn holds_come_out_of_the_cycle() {
    let split = calculate_durations_from_bpm_ratio(6.0, 1.0, 2.0, 2.0);
    assert!(close(split.inhale, 3.0));
    assert!(close(split.exhale, 3.0));
}

#[test]
fn breathing_budget_and_ratio_are_floored() {
    // Holds exceed the 2 s cycle; budget floors at 0.5 s.
    let split = calculate_durations_from_bpm_ratio(30.0, 1.0, 5.0, 5.0);
    assert!(close(split.inhale + split.exhale, MIN_BREATHING_SECONDS));

    let split = calculate_durations_from_bpm_ratio(6.0, 0.0, 0.0, 0.0);
    assert!(close(split.exhale / split.inhale, MIN_EXHALE_RATIO));
}

#[test]
fn breathing_phases_stay_positive_across_inputs() {
    for bpm in [0.5, 1.0, 3.0, 6.0, 12.0, 30.0, 60.0, 600.0, 1e6] {
        for ratio in [0.1, 0.5, 1.0, 2.0, 8.0] {
            for holds in [0.0, 1.0, 4.0, 30.0] {
                let s = calculate_durations_from_bpm_ratio(bpm, ratio, holds, holds);
                assert!(s.inhale > 0.0 && s.exhale > 0.0);
                assert!(s.inhale + s.exhale + 2.0 * holds >= MIN_BREATHING_SECONDS - 1e-12);
            }
        }
    }
}

#[test]
fn degenerate_bpm_does_not_panic_or_go_infinite() {
    for bpm in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let s = calculate_durations_from_bpm_ratio(bpm, 1.5, 0.0, 0.0);
        assert!(s.inhale.is_finite() && s.inhale > 0.0);
        assert!(s.exhale.is_finite() && s.exhale > 0.0);
    }
}

#[test]
fn phase_durations_follow_mode() {
    let mut settings = Settings::default();
    let d = calculate_phase_durations(&settings);
    assert!(close(d.inhale, 4.0) && close(d.exhale, 6.0));
    assert!(close(d.total(), 10.0));

    settings.set_inhale_seconds(3.0);
    settings.set_exhale_seconds(5.0);
    settings.set_hold_inhale(1.0);
    let d = calculate_phase_durations(&settings);
    assert_eq!(d.inhale, 3.0);
    assert_eq!(d.exhale, 5.0);
    assert_eq!(d.of(CyclePhase::HoldInhale), 1.0);
    assert_eq!(d.of(CyclePhase::HoldExhale), 0.0);
}

#[test]
fn next_phase_skips_empty_holds() {
    let no_holds = PhaseDurations {
        inhale: 4.0,
        hold_inhale: 0.0,
        exhale: 4.0,
        hold_exhale: 0.0,
    };
    assert_eq!(CyclePhase::Inhale.next(&no_holds), CyclePhase::Exhale);
    assert_eq!(CyclePhase::Exhale.next(&no_holds), CyclePhase::Inhale);

    let boxed = PhaseDurations {
        hold_inhale: 4.0,
        hold_exhale: 4.0,
        ..no_holds
    };
    let mut p = CyclePhase::Inhale;
    let mut seen = Vec::new();
    for _ in 0..4 {
        p = p.next(&boxed);
        seen.push(p);
    }
    assert_eq!(
        seen,
        [
            CyclePhase::HoldInhale,
            CyclePhase::Exhale,
            CyclePhase::HoldExhale,
            CyclePhase::Inhale
        ]
    );
}

#[test]
fn countdown_formatting() {
    assert_eq!(format_countdown_seconds(12.4), "12");
    assert_eq!(format_countdown_seconds(10.0), "10");
    assert_eq!(format_countdown_seconds(3.0), "3");
    assert_eq!(format_countdown_seconds(3.26), "3.3");
    assert_eq!(format_countdown_seconds(-1.0), "0");
}
