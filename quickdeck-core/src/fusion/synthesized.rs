//! Synthesized orientation channel
//!
//! A computed channel with an explicit dependency on another module's
//! current estimate. It has no read path of its own:
//!
//! ```text
//! pitch = source.pitch + offset(cycles)
//! roll  = source.roll
//! yaw   = source.yaw
//!
//! offset(n) = (n mod period) · step      period = ⌊ceiling / step⌋ + 1
//! ```
//!
//! The offset climbs by `step` each fusion cycle, reaches `ceiling`, and
//! wraps to zero on the following cycle. Only the cycle counter is kept,
//! so the sawtooth is exact and restarts cleanly.

use libm::floorf;

use super::Orientation;
use crate::constants::fusion::{SYNTH_OFFSET_CEILING_DEG, SYNTH_OFFSET_STEP_DEG};

/// Slack absorbing rounding in `ceiling / step`
const PERIOD_EPSILON: f32 = 1e-3;

/// Derived module whose orientation follows another module
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedChannel {
    step: f32,
    ceiling: f32,
    /// Offset values per sawtooth period
    period: u32,
    /// Position within the current period
    cycles: u32,
}

impl Default for SynthesizedChannel {
    fn default() -> Self {
        Self::new(SYNTH_OFFSET_STEP_DEG, SYNTH_OFFSET_CEILING_DEG)
    }
}

impl SynthesizedChannel {
    /// Sawtooth climbing by `step` degrees per cycle up to `ceiling`
    ///
    /// A step that is not finite and positive, or a negative ceiling,
    /// gives a constant zero offset.
    pub fn new(step: f32, ceiling: f32) -> Self {
        let period = if step.is_finite() && step > 0.0 && ceiling.is_finite() && ceiling >= 0.0 {
            floorf(ceiling / step + PERIOD_EPSILON) as u32 + 1
        } else {
            1
        };

        Self {
            step,
            ceiling,
            period,
            cycles: 0,
        }
    }

    /// Current pitch offset in degrees
    pub fn offset(&self) -> f32 {
        if self.period <= 1 {
            return 0.0;
        }
        self.cycles as f32 * self.step
    }

    /// Orientation of the synthesized module for `source`'s estimate
    ///
    /// Pure: does not advance the offset.
    pub fn derive(&self, source: Orientation) -> Orientation {
        Orientation {
            pitch: source.pitch + self.offset(),
            roll: source.roll,
            yaw: source.yaw,
        }
    }

    /// Advance one fusion cycle, then derive from `source`
    pub fn next(&mut self, source: Orientation) -> Orientation {
        self.advance();
        self.derive(source)
    }

    /// Move the offset one step along the sawtooth
    pub fn advance(&mut self) {
        self.cycles = (self.cycles + 1) % self.period;
    }

    /// Restart the sawtooth at zero
    pub fn reset(&mut self) {
        self.cycles = 0;
    }

    /// Offset values per period
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Offset ceiling in degrees
    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }
}
