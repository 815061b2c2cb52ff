//! Fixed-interval sampling scheduler
//!
//! The node loop calls [`SampleScheduler::tick`] on every iteration. It
//! fires once `now - last_sample >= interval` and then restarts the
//! interval from `now`:
//!
//! ```text
//! interval = 100
//!
//! now:    0 ... 100 ... 230 ... 330 ... 430
//! fires:        ✓       ✓       ✓       ✓
//!                       └ late tick, next one is 100 after 230
//! ```
//!
//! A late tick pushes every later tick back. There is no catch-up burst,
//! so phase drifts but spacing never drops below the interval.

use crate::time::{elapsed_ms, Timestamp};

/// One fired sampling slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Time the tick fired
    pub now: Timestamp,
    /// Milliseconds since the previous tick (or since boot)
    pub elapsed_ms: u64,
}

impl Tick {
    /// Elapsed time in seconds, the fusion step width
    pub fn dt_s(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }
}

/// Interval check for one node
#[derive(Debug, Clone)]
pub struct SampleScheduler {
    interval_ms: u64,
    last_sample: Timestamp,
}

impl SampleScheduler {
    /// Scheduler firing every `interval_ms`, counted from boot
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_sample: 0,
        }
    }

    /// Fire if the interval has elapsed at `now`
    pub fn tick(&mut self, now: Timestamp) -> Option<Tick> {
        let elapsed = elapsed_ms(self.last_sample, now);
        if elapsed < self.interval_ms {
            return None;
        }

        self.last_sample = now;
        Some(Tick {
            now,
            elapsed_ms: elapsed,
        })
    }

    /// Configured interval
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Time of the last fired tick
    pub fn last_sample(&self) -> Timestamp {
        self.last_sample
    }

    /// Restart the interval from `now` without firing
    pub fn restart(&mut self, now: Timestamp) {
        self.last_sample = now;
    }
}
