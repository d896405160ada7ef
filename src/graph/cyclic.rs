//! Breath level of the simple four-phase cycle at any time.

use crate::animation::ease::Ease;
use crate::rhythm::durations::PhaseDurations;

/// Breath level in `[0, 1]` at `time_sec` for the simple four-phase cycle.
///
/// Time wraps modulo the cycle length, negative times included. A zero-length cycle reads as
/// empty lungs.
pub fn breath_value_at(time_sec: f64, d: &PhaseDurations, ease: Ease) -> f64 {
    let total = d.total();
    if total.is_nan() || total <= 0.0 || !time_sec.is_finite() {
        return 0.0;
    }
    let t = time_sec.rem_euclid(total);

    if t < d.inhale {
        return ease.apply(t / d.inhale);
    }
    if t < d.inhale + d.hold_inhale {
        return 1.0;
    }
    let into_exhale = t - (d.inhale + d.hold_inhale);
    if into_exhale < d.exhale {
        return 1.0 - ease.apply(into_exhale / d.exhale);
    }
    0.0
}

#[cfg(test)]
#[path = "../../tests/unit/graph/cyclic.rs"]
mod tests;
