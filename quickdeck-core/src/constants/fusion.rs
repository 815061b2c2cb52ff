//! Fusion Constants
//!
//! Parameters of the complementary filter and the sensitivities used to
//! convert raw inertial counts to physical units.

/// Complementary filter weight on the gyro-integrated angle.
///
/// 0.98 at 100 Hz gives a crossover near 0.5 s: the gyro dominates
/// short-term motion, the accelerometer removes drift over seconds.
pub const COMPLEMENTARY_ALPHA: f32 = 0.98;

/// Gyro sensitivity at ±250 °/s (LSB per °/s).
pub const GYRO_LSB_PER_DPS_250: f32 = 131.0;

/// Gyro sensitivity at ±500 °/s (LSB per °/s).
pub const GYRO_LSB_PER_DPS_500: f32 = 65.5;

/// Gyro sensitivity at ±1000 °/s (LSB per °/s).
pub const GYRO_LSB_PER_DPS_1000: f32 = 32.8;

/// Gyro sensitivity at ±2000 °/s (LSB per °/s).
pub const GYRO_LSB_PER_DPS_2000: f32 = 16.4;

/// Accelerometer sensitivity at ±2 g (LSB per g).
pub const ACCEL_LSB_PER_G_2: f32 = 16384.0;

/// Accelerometer sensitivity at ±4 g (LSB per g).
pub const ACCEL_LSB_PER_G_4: f32 = 8192.0;

/// Accelerometer sensitivity at ±8 g (LSB per g).
pub const ACCEL_LSB_PER_G_8: f32 = 4096.0;

/// Accelerometer sensitivity at ±16 g (LSB per g).
pub const ACCEL_LSB_PER_G_16: f32 = 2048.0;

/// Largest fusion step integrated in one cycle (seconds).
///
/// The first tick after boot or after calibration can see seconds of
/// elapsed time; the gyro step is clamped to five nominal cycles.
pub const MAX_FUSION_DT_S: f32 = 0.05;

/// Synthesized module pitch offset increment per fusion cycle (degrees).
pub const SYNTH_OFFSET_STEP_DEG: f32 = 0.1;

/// Synthesized module pitch offset ceiling (degrees).
///
/// The offset wraps to zero on the cycle after it reaches this value.
pub const SYNTH_OFFSET_CEILING_DEG: f32 = 30.0;

/// Samples averaged by the at-rest bias calibration.
pub const CALIBRATION_ITERATIONS: u16 = 1000;
