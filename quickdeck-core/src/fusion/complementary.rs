//! Complementary filter
//!
//! Per fusion cycle of width `dt` seconds:
//!
//! ```text
//! accel_pitch = atan2(ay, √(ax² + az²))          degrees
//! accel_roll  = atan2(-ax, az)                   degrees
//! rate        = gyro_counts / lsb_per_dps        °/s
//!
//! pitch = α·(pitch + rate_y·dt) + (1-α)·accel_pitch
//! roll  = α·(roll  + rate_x·dt) + (1-α)·accel_roll
//! yaw   =   yaw   + rate_z·dt
//! ```
//!
//! A cycle without a sample (failed bus read) re-emits the previous
//! estimate unchanged.

use core::f32::consts::PI;

use libm::{atan2f, sqrtf};

use super::Orientation;
use crate::{
    channel::{GyroRange, MotionSample},
    constants::fusion::{COMPLEMENTARY_ALPHA, MAX_FUSION_DT_S},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const DEG_PER_RAD: f32 = 180.0 / PI;

/// Filter parameters
///
/// Defaults to α = 0.98 and the ±250 °/s gyro sensitivity. Tests inject
/// other values without touching the algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FusionConfig {
    /// Weight on the gyro-integrated angle, in `[0, 1]`
    pub alpha: f32,
    /// Gyro counts per degree/second
    pub gyro_lsb_per_dps: f32,
    /// Largest `dt` integrated in one cycle (seconds)
    pub max_dt_s: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            alpha: COMPLEMENTARY_ALPHA,
            gyro_lsb_per_dps: GyroRange::Dps250.lsb_per_dps(),
            max_dt_s: MAX_FUSION_DT_S,
        }
    }
}

impl FusionConfig {
    /// Override the gyro weight; clamped to `[0, 1]`
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        if alpha.is_finite() {
            self.alpha = alpha.clamp(0.0, 1.0);
        }
        self
    }

    /// Take the gyro sensitivity from a full-scale range
    pub fn with_gyro_range(mut self, range: GyroRange) -> Self {
        self.gyro_lsb_per_dps = range.lsb_per_dps();
        self
    }

    /// Override the largest integrated step
    pub fn with_max_dt(mut self, max_dt_s: f32) -> Self {
        if max_dt_s.is_finite() && max_dt_s > 0.0 {
            self.max_dt_s = max_dt_s;
        }
        self
    }
}

/// Complementary filter state for one inertial module
#[derive(Debug, Clone)]
pub struct ComplementaryFilter {
    config: FusionConfig,
    estimate: Orientation,
}

impl ComplementaryFilter {
    /// Filter starting from a level, zero-yaw orientation
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            estimate: Orientation::default(),
        }
    }

    /// Run one fusion cycle
    ///
    /// `None` means the module could not be read this cycle; the previous
    /// estimate is returned unchanged.
    pub fn update(&mut self, sample: Option<&MotionSample>, dt_s: f32) -> Orientation {
        match sample {
            Some(sample) => self.fuse(sample, dt_s),
            None => self.estimate,
        }
    }

    /// Fuse one bias-corrected sample
    pub fn fuse(&mut self, sample: &MotionSample, dt_s: f32) -> Orientation {
        let dt = if dt_s.is_finite() {
            dt_s.clamp(0.0, self.config.max_dt_s)
        } else {
            0.0
        };

        let (accel_pitch, accel_roll) = accel_tilt(sample);

        let rate_x = sample.gyro[0] / self.config.gyro_lsb_per_dps;
        let rate_y = sample.gyro[1] / self.config.gyro_lsb_per_dps;
        let rate_z = sample.gyro[2] / self.config.gyro_lsb_per_dps;

        let prev = self.estimate;
        let gyro_pitch = prev.pitch + rate_y * dt;
        let gyro_roll = prev.roll + rate_x * dt;
        let gyro_yaw = prev.yaw + rate_z * dt;

        let alpha = self.config.alpha;
        self.estimate = Orientation {
            pitch: alpha * gyro_pitch + (1.0 - alpha) * accel_pitch,
            roll: alpha * gyro_roll + (1.0 - alpha) * accel_roll,
            yaw: gyro_yaw,
        };
        self.estimate
    }

    /// Latest estimate
    pub fn estimate(&self) -> Orientation {
        self.estimate
    }

    /// Filter parameters
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Return to a level, zero-yaw orientation
    pub fn reset(&mut self) {
        self.estimate = Orientation::default();
    }
}

/// Pitch and roll implied by gravity alone, in degrees
pub fn accel_tilt(sample: &MotionSample) -> (f32, f32) {
    let [ax, ay, az] = sample.accel;
    let pitch = atan2f(ay, sqrtf(ax * ax + az * az)) * DEG_PER_RAD;
    let roll = atan2f(-ax, az) * DEG_PER_RAD;
    (pitch, roll)
}
