//! Channel drivers
//!
//! A channel is one sensing element managed by a node:
//!
//! - [`StrainChannel`]: a bridge amplifier channel with tare offset and
//!   calibration scale
//! - [`InertialModule`]: an accelerometer/gyroscope module with at-rest
//!   bias offsets
//!
//! Both wrap a hardware trait object from [`crate::traits::hardware`] and
//! keep their own ready flag. Channel state is only changed by command
//! handling; sampling reads it.

pub mod inertial;
pub mod strain;

pub use inertial::{
    AccelRange, Bias, CalibrationReport, FullScale, GyroRange, InertialModule, MotionSample,
    RawMotion,
};
pub use strain::{Gain, PinPair, StrainChannel};
