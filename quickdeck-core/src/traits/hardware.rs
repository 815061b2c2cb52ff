//! Sensor hardware traits
//!
//! ## Strain amplifiers
//!
//! A bridge amplifier (HX711 class) sits behind a data/clock pin pair. It
//! signals a finished conversion by pulling its data line low; reading
//! shifts out a signed 24-bit count and latches the next conversion.
//!
//! ## Motion sensors
//!
//! A 6-axis accelerometer/gyroscope (MPU-6050 class) on a shared bus.
//! One read returns all six raw axes in a single transaction.
//!
//! ## Example Implementation
//!
//! ```rust
//! use quickdeck_core::traits::StrainAmplifier;
//! use quickdeck_core::channel::Gain;
//!
//! struct FixedBridge {
//!     count: i32,
//! }
//!
//! impl StrainAmplifier for FixedBridge {
//!     type Error = ();
//!
//!     fn begin(&mut self, _gain: Gain) -> Result<(), ()> {
//!         Ok(())
//!     }
//!
//!     fn is_ready(&mut self) -> bool {
//!         true
//!     }
//!
//!     fn read_raw(&mut self) -> Result<i32, ()> {
//!         Ok(self.count)
//!     }
//! }
//! ```

use core::fmt::Debug;

use crate::channel::{FullScale, Gain, RawMotion};

/// One bridge amplifier channel
pub trait StrainAmplifier {
    /// Driver-specific failure
    type Error: Debug;

    /// Power up, select `gain` and check that the amplifier answers
    ///
    /// Called once at node boot. An error means the channel was not found.
    fn begin(&mut self, gain: Gain) -> Result<(), Self::Error>;

    /// True once a conversion is available to read
    ///
    /// Must not block.
    fn is_ready(&mut self) -> bool;

    /// Shift out the latest raw count
    ///
    /// Only called after `is_ready()` returned true. Reading latches the
    /// next conversion; it has no other side effect.
    fn read_raw(&mut self) -> Result<i32, Self::Error>;
}

/// One accelerometer/gyroscope module
pub trait MotionSensor {
    /// Bus failure type
    type Error: Debug;

    /// Wake the module and program its full-scale ranges
    ///
    /// Called once at node boot. An error means the module was not found.
    fn begin(&mut self, ranges: FullScale) -> Result<(), Self::Error>;

    /// Read all six raw axes in one bus transaction
    fn read_raw(&mut self) -> Result<RawMotion, Self::Error>;
}

/// Blocking millisecond delay
///
/// Only calibration routines block; the sampling loop never does.
pub trait Delay {
    /// Busy-wait or sleep for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}
