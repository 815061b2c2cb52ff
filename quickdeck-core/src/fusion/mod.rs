//! Orientation fusion for the motion node
//!
//! ## Complementary Filter
//!
//! Each inertial module has one [`ComplementaryFilter`] that blends a
//! slow-but-stable tilt from the accelerometer with a fast-but-drifting
//! angle integrated from the gyroscope:
//!
//! ```text
//! accel ──→ atan2 tilt ────────────┐
//!                                  ├─→ α·gyro + (1-α)·accel ─→ pitch, roll
//! gyro ──→ ∫ rate dt ──────────────┘
//!      └─→ ∫ rate dt ─────────────────────────────────────→ yaw
//! ```
//!
//! Yaw has no absolute reference and drifts with residual gyro bias.
//! That drift is accepted.
//!
//! ## Synthesized Module
//!
//! The third orientation in a motion record does not come from a sensor.
//! [`SynthesizedChannel`] derives it from the second module's estimate
//! plus a sawtooth pitch offset, so it is a pure function of that
//! estimate and the number of elapsed cycles.

pub mod complementary;
pub mod synthesized;

pub use complementary::{ComplementaryFilter, FusionConfig};
pub use synthesized::SynthesizedChannel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fused orientation of one module, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orientation {
    /// Rotation about Y
    pub pitch: f32,
    /// Rotation about X
    pub roll: f32,
    /// Rotation about Z, gyro-integrated only
    pub yaw: f32,
}

impl Orientation {
    /// Orientation from its three angles
    pub const fn new(pitch: f32, roll: f32, yaw: f32) -> Self {
        Self { pitch, roll, yaw }
    }
}
