//! Pause-aware session clock.

use crate::foundation::core::Millis;

/// Pause-aware session time.
///
/// Every phase anchor and graph time is expressed in seconds of this clock. It reads no wall
/// clock itself: callers pass the frame timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionClock {
    start: Option<Millis>,
    total_paused_ms: f64,
    pause_started_at: Option<Millis>,
    floor_sec: f64,
}

impl SessionClock {
    /// A clock that has not started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) at `now`.
    pub fn start(&mut self, now: Millis) {
        *self = Self {
            start: Some(now),
            ..Self::default()
        };
    }

    /// Freeze elapsed time. No-op when not running or already paused.
    pub fn pause(&mut self, now: Millis) {
        if self.start.is_some() && self.pause_started_at.is_none() {
            self.floor_sec = self.elapsed_seconds(now);
            self.pause_started_at = Some(now);
        }
    }

    /// Resume counting. The paused span is excluded from elapsed time.
    pub fn resume(&mut self, now: Millis) {
        if let Some(p) = self.pause_started_at.take() {
            self.total_paused_ms += now.since(p).max(0.0);
        }
    }

    /// Back to not started.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Return `true` between `start` and `reset`.
    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Return `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Milliseconds spent paused so far, the current pause included.
    pub fn paused_ms(&self, now: Millis) -> f64 {
        let current = self
            .pause_started_at
            .map_or(0.0, |p| now.since(p).max(0.0));
        self.total_paused_ms + current
    }

    /// Elapsed seconds excluding pauses. Zero before `start`; frozen while paused; never below
    /// the value frozen at the last pause.
    pub fn elapsed_seconds(&self, now: Millis) -> f64 {
        let Some(start) = self.start else {
            return 0.0;
        };
        if self.pause_started_at.is_some() {
            return self.floor_sec;
        }
        ((now.since(start) - self.total_paused_ms) / 1000.0).max(self.floor_sec)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/clock.rs"]
mod tests;
