//! Sampling and Link Constants

use crate::time::Timestamp;

/// Strain node sampling interval (milliseconds).
///
/// 10 Hz. Bridge amplifiers convert at 10 SPS in their default rate
/// mode, so sampling faster would only repeat readings.
pub const STRAIN_SAMPLE_INTERVAL_MS: Timestamp = 100;

/// Motion node sampling interval (milliseconds).
///
/// 100 Hz. Also the fusion cycle: each tick integrates one gyro step.
pub const MOTION_SAMPLE_INTERVAL_MS: Timestamp = 10;

/// Serial link baud rate, 8-N-1.
pub const BAUD_RATE: u32 = 115_200;

/// Delay between samples while averaging inertial bias (milliseconds).
pub const CALIBRATION_SAMPLE_DELAY_MS: u32 = 3;
