//! Render-loop timing.

use crate::state::{FrameInput, TreeState};
use instant::Instant;

/// Tracks elapsed and per-frame delta seconds.
///
/// Visual state is driven by these values, never by the frame count.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: f32,
    delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            elapsed: 0.0,
            delta: 0.0,
        }
    }

    /// Advance from the wall clock. The first tick has a zero delta.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last {
            Some(prev) => (now - prev).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        self.advance(dt)
    }

    /// Advance by an explicit delta. Negative or non-finite deltas count as
    /// zero.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.delta = dt;
        self.elapsed += dt;
        dt
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Snapshot for this frame's animators.
    pub fn frame(&self, state: TreeState) -> FrameInput {
        FrameInput::new(self.delta, self.elapsed, state)
    }
}
