//! Frame timing utilities.
//!
//! The runner owns a [`TimeClock`] and calls `tick()` once per frame; the
//! resulting [`Time`] snapshot drives the camera controller and the time
//! uniform of the shading pass.

use std::time::Instant;

/// A snapshot of timing information for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds elapsed since the previous frame, clamped to
    /// [`TimeClock::MAX_DELTA`] so a stalled frame does not teleport the
    /// camera.
    pub delta: f32,

    /// Total seconds elapsed since the clock was created.
    pub elapsed: f64,

    /// Number of frames ticked before this one (starts at 0).
    pub frame_count: u64,

    /// Instantaneous frames-per-second derived from `delta`.
    pub fps: f32,
}

/// Stateful timer that accumulates time and produces [`Time`] snapshots.
#[derive(Debug, Clone)]
pub struct TimeClock {
    start: Instant,
    last_tick: Instant,
    frame_count: u64,
}

impl TimeClock {
    pub const MAX_DELTA: f32 = 0.1;

    /// Create a new clock, starting the epoch now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame_count: 0,
        }
    }

    /// Return the current [`Time`] snapshot without advancing the clock.
    pub fn peek(&self) -> Time {
        self.snapshot(Instant::now())
    }

    /// Advance by one frame.  Returns the [`Time`] snapshot for this frame.
    pub fn tick(&mut self) -> Time {
        let now = Instant::now();
        let time = self.snapshot(now);
        self.last_tick = now;
        self.frame_count += 1;
        time
    }

    fn snapshot(&self, now: Instant) -> Time {
        let delta = (now - self.last_tick).as_secs_f32().min(Self::MAX_DELTA);
        let elapsed = (now - self.start).as_secs_f64();
        let fps = if delta > 0.0 { 1.0 / delta } else { 0.0 };
        Time {
            delta,
            elapsed,
            frame_count: self.frame_count,
            fps,
        }
    }
}

impl Default for TimeClock {
    fn default() -> Self {
        Self::new()
    }
}
