//! Scrolling waveform sampler.
//!
//! The renderer never paints. Each frame it fills a reused point buffer (canvas pixels) and
//! reports where the "now" anchor and its dot sit; the host strokes the polyline.

use crate::animation::ease::Ease;
use crate::foundation::core::Canvas;
use crate::graph::cyclic::breath_value_at;
use crate::graph::timeline::{GraphTimeline, UNTIL_TAP_DISPLAY_SECONDS};
use crate::rhythm::durations::PhaseDurations;

/// Waveform layout and sampling options.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphOptions {
    /// Fraction of the width where "now" settles.
    pub anchor_fraction: f64,
    /// Seconds the anchor takes to ease in after a session starts.
    pub anchor_ramp_seconds: f64,
    /// Simple cycles visible across the width.
    pub cycles_visible: f64,
    /// Vertical padding in pixels.
    pub padding: f64,
    /// Horizontal distance between samples in pixels.
    pub sample_step_px: u32,
    /// Seconds an until-tap hold occupies on the graph.
    pub until_tap_display_seconds: f64,
    /// Seconds visible across the width for composable presets.
    pub composable_window_seconds: f64,
    /// Curve for inhale and exhale segments.
    pub ease: Ease,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            anchor_fraction: 0.2,
            anchor_ramp_seconds: 1.2,
            cycles_visible: 2.0,
            padding: 12.0,
            sample_step_px: 2,
            until_tap_display_seconds: UNTIL_TAP_DISPLAY_SECONDS,
            composable_window_seconds: 20.0,
            ease: Ease::InOutSine,
        }
    }
}

/// What the waveform is sampled from.
#[derive(Clone, Copy, Debug)]
pub enum GraphSource<'a> {
    /// Simple cycle, wrapping forever.
    Cyclic(&'a PhaseDurations),
    /// Flattened composable preset, clamped to its length.
    Timeline(&'a GraphTimeline),
}

impl GraphSource<'_> {
    /// Breath level at graph time `t`.
    pub fn value_at(&self, t: f64, ease: Ease) -> f64 {
        match self {
            Self::Cyclic(d) => breath_value_at(t, d, ease),
            Self::Timeline(tl) => tl.value_at(t, ease),
        }
    }

    fn window_seconds(&self, opts: &GraphOptions) -> f64 {
        match self {
            Self::Cyclic(d) => d.total() * opts.cycles_visible,
            Self::Timeline(_) => opts.composable_window_seconds,
        }
    }
}

/// One polyline vertex in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct GraphPoint {
    /// X in pixels.
    pub x: f64,
    /// Y in pixels; 0 is the top edge.
    pub y: f64,
}

/// Per-frame scroll state for the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFrame {
    /// Graph time represented by the anchor.
    pub now_sec: f64,
    /// X of the anchor line.
    pub anchor_x: f64,
    /// Breath level at the anchor.
    pub dot_level: f64,
    /// Y of the anchor dot.
    pub dot_y: f64,
    /// Graph seconds per horizontal pixel.
    pub seconds_per_pixel: f64,
    /// Graph time at x = 0.
    pub visible_start: f64,
    /// Graph time at the right edge.
    pub visible_end: f64,
}

/// Waveform sampler with a reused point buffer.
#[derive(Clone, Debug)]
pub struct GraphRenderer {
    opts: GraphOptions,
    canvas: Canvas,
    points: Vec<GraphPoint>,
}

impl GraphRenderer {
    /// Create a renderer for `canvas`.
    pub fn new(opts: GraphOptions, canvas: Canvas) -> Self {
        let mut r = Self {
            opts,
            canvas,
            points: Vec::new(),
        };
        r.reserve_points();
        r
    }

    /// Options in use.
    pub fn options(&self) -> &GraphOptions {
        &self.opts
    }

    /// Current canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Change the canvas size. Graph time is independent of pixels, so the next frame simply
    /// samples the same moment at the new resolution.
    pub fn resize(&mut self, canvas: Canvas) {
        self.canvas = canvas;
        self.points.clear();
        self.reserve_points();
    }

    /// Points produced by the last [`GraphRenderer::render`].
    pub fn points(&self) -> &[GraphPoint] {
        &self.points
    }

    fn step_px(&self) -> u32 {
        self.opts.sample_step_px.max(1)
    }

    fn reserve_points(&mut self) {
        let n = (self.canvas.width / self.step_px()) as usize + 2;
        self.points.reserve(n.saturating_sub(self.points.len()));
    }

    /// Anchor position, eased in over the ramp after `since_start` seconds of session time.
    /// `None` (idle) puts the anchor at the left edge.
    pub fn anchor_x(&self, since_start: Option<f64>) -> f64 {
        let full = f64::from(self.canvas.width) * self.opts.anchor_fraction;
        let Some(t) = since_start else {
            return 0.0;
        };
        let ramp = if self.opts.anchor_ramp_seconds > 0.0 {
            self.opts.ease.apply(t / self.opts.anchor_ramp_seconds)
        } else {
            1.0
        };
        full * ramp
    }

    fn y_for(&self, level: f64) -> f64 {
        let height = f64::from(self.canvas.height);
        let inner = (height - self.opts.padding * 2.0).max(1.0);
        self.opts.padding + (1.0 - level) * inner
    }

    /// Sample `source` around `graph_time` into the point buffer.
    pub fn render(
        &mut self,
        source: GraphSource<'_>,
        graph_time: f64,
        since_start: Option<f64>,
    ) -> GraphFrame {
        self.points.clear();
        let ease = self.opts.ease;
        let dot_level = source.value_at(graph_time, ease);
        if self.canvas.is_empty() {
            return GraphFrame {
                now_sec: graph_time,
                dot_level,
                visible_start: graph_time,
                visible_end: graph_time,
                ..GraphFrame::default()
            };
        }

        let width = f64::from(self.canvas.width);
        let window = source.window_seconds(&self.opts);
        let spp = if window.is_finite() && window > 0.0 {
            window / width
        } else {
            0.0
        };
        let anchor_x = self.anchor_x(since_start);

        let step = self.step_px();
        let mut x = 0u32;
        while x <= self.canvas.width {
            let xf = f64::from(x);
            let level = source.value_at(graph_time + (xf - anchor_x) * spp, ease);
            let y = self.y_for(level);
            self.points.push(GraphPoint { x: xf, y });
            x += step;
        }

        GraphFrame {
            now_sec: graph_time,
            anchor_x,
            dot_level,
            dot_y: self.y_for(dot_level),
            seconds_per_pixel: spp,
            visible_start: graph_time - anchor_x * spp,
            visible_end: graph_time + (width - anchor_x) * spp,
        }
    }
}

/// Maps session time to composable graph time.
///
/// Graph time is `session - cycle_anchor`, except that it freezes at the end of the current
/// until-tap placeholder while a tap is awaited, and jumps to that end when the tap arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComposableGraphClock {
    cycle_anchor: f64,
    paused_at: Option<f64>,
    until_tap_cursor: usize,
}

impl ComposableGraphClock {
    /// Start with graph time 0 at session time `anchor`.
    pub fn new(anchor: f64) -> Self {
        Self {
            cycle_anchor: anchor,
            ..Self::default()
        }
    }

    /// Session time at which graph time was 0.
    pub fn cycle_anchor(&self) -> f64 {
        self.cycle_anchor
    }

    /// Graph time frozen at an until-tap boundary, if any.
    pub fn paused_at(&self) -> Option<f64> {
        self.paused_at
    }

    /// Index of the next until-tap hold the graph will stop at.
    pub fn until_tap_cursor(&self) -> usize {
        self.until_tap_cursor
    }

    /// Graph time for `session_time`.
    pub fn graph_time(
        &mut self,
        session_time: f64,
        timeline: &GraphTimeline,
        awaiting_tap: bool,
    ) -> f64 {
        let t = session_time - self.cycle_anchor;
        if timeline.is_empty() {
            return t;
        }
        if let Some(p) = self.paused_at {
            return p;
        }
        if let Some(e) = timeline.until_tap_entry(self.until_tap_cursor)
            && awaiting_tap
            && t >= e.end_time
        {
            tracing::trace!(at = e.end_time, "graph frozen at until-tap boundary");
            self.paused_at = Some(e.end_time);
            return e.end_time;
        }
        t.min(timeline.total_duration())
    }

    /// Realign so the current until-tap hold's end is "now", and aim at the next one.
    pub fn advance_past_until_tap(&mut self, session_time: f64, timeline: &GraphTimeline) {
        let Some(e) = timeline.until_tap_entry(self.until_tap_cursor) else {
            return;
        };
        self.cycle_anchor = session_time - e.end_time;
        self.paused_at = None;
        self.until_tap_cursor += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/renderer.rs"]
mod tests;
