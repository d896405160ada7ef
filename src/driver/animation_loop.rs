//! Frame scheduling adapter.
//!
//! The platform owns the real frame callback. [`AnimationLoop`] keeps at most one frame request
//! outstanding, drops callbacks for requests it already cancelled, and feeds the live one into
//! [`BreathSession::tick`].

use crate::foundation::core::Millis;
use crate::session::breath_session::{BreathSession, FrameOutput, RunState};
use crate::session::cues::CueSink;

/// Opaque id of one requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host frame scheduler (`requestAnimationFrame` / `cancelAnimationFrame`).
pub trait FrameScheduler {
    /// Ask for one callback on the next paint.
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request made earlier.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Owns the single outstanding frame request for a session.
#[derive(Debug)]
pub struct AnimationLoop<F: FrameScheduler> {
    scheduler: F,
    pending: Option<FrameHandle>,
}

impl<F: FrameScheduler> AnimationLoop<F> {
    /// Loop with nothing scheduled.
    pub fn new(scheduler: F) -> Self {
        Self {
            scheduler,
            pending: None,
        }
    }

    /// Scheduler.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// Mutable scheduler.
    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// Outstanding request, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Request a frame unless one is already outstanding.
    pub fn ensure_scheduled(&mut self) -> FrameHandle {
        if let Some(h) = self.pending {
            return h;
        }
        let h = self.scheduler.request_frame();
        tracing::trace!(handle = h.0, "frame requested");
        self.pending = Some(h);
        h
    }

    /// Cancel the outstanding request.
    pub fn cancel(&mut self) {
        if let Some(h) = self.pending.take() {
            tracing::trace!(handle = h.0, "frame cancelled");
            self.scheduler.cancel_frame(h);
        }
    }

    /// Frame callback. Callbacks for anything but the outstanding request are ignored.
    pub fn on_frame<S: CueSink>(
        &mut self,
        handle: FrameHandle,
        session: &mut BreathSession<S>,
        now: Millis,
    ) -> Option<FrameOutput> {
        if self.pending != Some(handle) {
            tracing::debug!(handle = handle.0, "stale frame callback ignored");
            return None;
        }
        self.pending = None;
        let tick = session.tick(now);
        if tick.request_next {
            self.ensure_scheduled();
        }
        Some(tick.output)
    }

    fn sync<S: CueSink>(&mut self, session: &BreathSession<S>) {
        if session.run_state() == RunState::Running {
            self.ensure_scheduled();
        } else {
            self.cancel();
        }
    }

    /// Start or resume the session and schedule frames.
    pub fn start<S: CueSink>(&mut self, session: &mut BreathSession<S>, now: Millis) {
        session.start(now);
        self.sync(session);
    }

    /// Pause the session and stop frames.
    pub fn pause<S: CueSink>(&mut self, session: &mut BreathSession<S>, now: Millis) {
        session.pause(now);
        self.sync(session);
    }

    /// Circle tap.
    pub fn toggle<S: CueSink>(&mut self, session: &mut BreathSession<S>, now: Millis) -> RunState {
        let state = session.toggle(now);
        self.sync(session);
        state
    }

    /// Until-tap signal.
    pub fn tap<S: CueSink>(&mut self, session: &mut BreathSession<S>, now: Millis) -> bool {
        let moved = session.tap(now);
        self.sync(session);
        moved
    }

    /// Reset the session and stop frames.
    pub fn reset<S: CueSink>(&mut self, session: &mut BreathSession<S>) {
        session.reset();
        self.cancel();
    }
}

/// In-memory scheduler for tests and headless drivers.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl ManualScheduler {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests still waiting, oldest first.
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Drain the waiting requests.
    pub fn take_pending(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let h = FrameHandle(self.next_id);
        self.pending.push(h);
        h
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }
}

/// Drive `session` headlessly from `start` for `seconds`, one frame every `1/fps` seconds,
/// calling `on_tap` before each frame to decide whether that frame carries a tap.
///
/// Returns every frame output in order. Stops early when the session stops requesting frames.
pub fn run_headless<S: CueSink>(
    session: &mut BreathSession<S>,
    start: Millis,
    seconds: f64,
    fps: f64,
    mut on_tap: impl FnMut(f64) -> bool,
) -> Vec<FrameOutput> {
    let mut lp = AnimationLoop::new(ManualScheduler::new());
    lp.start(session, start);
    let dt_ms = if fps.is_finite() && fps > 0.0 {
        1000.0 / fps
    } else {
        1000.0 / 60.0
    };
    let end = start.offset(seconds.max(0.0) * 1000.0);
    let mut out = Vec::new();
    let mut frame = 0u64;
    loop {
        let now = start.offset(frame as f64 * dt_ms);
        if now.0 > end.0 {
            break;
        }
        let Some(handle) = lp.scheduler_mut().take_pending().pop() else {
            break;
        };
        let t = session.elapsed_seconds(now);
        if on_tap(t) {
            lp.tap(session, now);
        }
        let Some(o) = lp.on_frame(handle, session, now) else {
            break;
        };
        out.push(o);
        frame += 1;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/driver/animation_loop.rs"]
mod tests;
