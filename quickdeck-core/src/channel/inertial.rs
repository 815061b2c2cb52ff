//! Inertial module driver
//!
//! Wraps one accelerometer/gyroscope and removes the at-rest bias
//! measured by [`InertialModule::calibrate`]. A failed bus read marks the
//! module not ready for that cycle; the estimator then holds the previous
//! orientation instead of fusing garbage.
//!
//! ## Bias model
//!
//! ```text
//! gyro_bias  = mean(g)                at rest, sensor should read 0
//! accel_bias = mean(a) - (0, 0, 1g)   at rest, gravity on +Z only
//! ```

use crate::{
    constants::{
        fusion::{
            ACCEL_LSB_PER_G_16, ACCEL_LSB_PER_G_2, ACCEL_LSB_PER_G_4, ACCEL_LSB_PER_G_8,
            GYRO_LSB_PER_DPS_1000, GYRO_LSB_PER_DPS_2000, GYRO_LSB_PER_DPS_250,
            GYRO_LSB_PER_DPS_500,
        },
        sampling::CALIBRATION_SAMPLE_DELAY_MS,
    },
    errors::{NodeError, NodeResult},
    traits::{Delay, MotionSensor},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Six signed raw axes from one bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawMotion {
    /// Acceleration X
    pub ax: i16,
    /// Acceleration Y
    pub ay: i16,
    /// Acceleration Z
    pub az: i16,
    /// Rotation rate X
    pub gx: i16,
    /// Rotation rate Y
    pub gy: i16,
    /// Rotation rate Z
    pub gz: i16,
}

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GyroRange {
    /// ±250 °/s
    #[default]
    Dps250,
    /// ±500 °/s
    Dps500,
    /// ±1000 °/s
    Dps1000,
    /// ±2000 °/s
    Dps2000,
}

impl GyroRange {
    /// Raw counts per degree/second
    pub fn lsb_per_dps(self) -> f32 {
        match self {
            Self::Dps250 => GYRO_LSB_PER_DPS_250,
            Self::Dps500 => GYRO_LSB_PER_DPS_500,
            Self::Dps1000 => GYRO_LSB_PER_DPS_1000,
            Self::Dps2000 => GYRO_LSB_PER_DPS_2000,
        }
    }
}

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccelRange {
    /// ±2 g
    #[default]
    G2,
    /// ±4 g
    G4,
    /// ±8 g
    G8,
    /// ±16 g
    G16,
}

impl AccelRange {
    /// Raw counts per g
    pub fn lsb_per_g(self) -> f32 {
        match self {
            Self::G2 => ACCEL_LSB_PER_G_2,
            Self::G4 => ACCEL_LSB_PER_G_4,
            Self::G8 => ACCEL_LSB_PER_G_8,
            Self::G16 => ACCEL_LSB_PER_G_16,
        }
    }
}

/// Full-scale ranges programmed into a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FullScale {
    /// Gyroscope range
    pub gyro: GyroRange,
    /// Accelerometer range
    pub accel: AccelRange,
}

/// Per-axis offsets in raw counts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bias {
    /// Accelerometer X/Y/Z offsets
    pub accel: [f32; 3],
    /// Gyroscope X/Y/Z offsets
    pub gyro: [f32; 3],
}

/// Bias-corrected axes, still in raw count units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    /// Acceleration X/Y/Z
    pub accel: [f32; 3],
    /// Rotation rate X/Y/Z
    pub gyro: [f32; 3],
}

impl MotionSample {
    /// Remove `bias` from a raw reading
    pub fn corrected(raw: RawMotion, bias: &Bias) -> Self {
        Self {
            accel: [
                f32::from(raw.ax) - bias.accel[0],
                f32::from(raw.ay) - bias.accel[1],
                f32::from(raw.az) - bias.accel[2],
            ],
            gyro: [
                f32::from(raw.gx) - bias.gyro[0],
                f32::from(raw.gy) - bias.gyro[1],
                f32::from(raw.gz) - bias.gyro[2],
            ],
        }
    }
}

/// Outcome of an at-rest calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    /// Reads that completed and were averaged
    pub samples_used: u16,
    /// Bias now in effect
    pub bias: Bias,
}

/// One accelerometer/gyroscope module
#[derive(Debug)]
pub struct InertialModule<S> {
    /// 1-based module number on the node
    number: u8,
    sensor: S,
    address: u8,
    ranges: FullScale,
    bias: Bias,
    /// Module answered at boot
    present: bool,
    /// Last bus transaction completed
    ready: bool,
}

impl<S: MotionSensor> InertialModule<S> {
    /// Wrap a sensor as module `number` at bus `address`
    pub fn new(number: u8, sensor: S, address: u8, ranges: FullScale) -> Self {
        Self {
            number,
            sensor,
            address,
            ranges,
            bias: Bias::default(),
            present: false,
            ready: false,
        }
    }

    /// Wake the module and program its ranges
    pub fn begin(&mut self) -> NodeResult<()> {
        match self.sensor.begin(self.ranges) {
            Ok(()) => {
                self.present = true;
                self.ready = true;
                log_info!("Inertial module {} at 0x{:02x} initialized", self.number, self.address);
                Ok(())
            }
            Err(_e) => {
                self.present = false;
                self.ready = false;
                log_warn!("Inertial module {} not found: {:?}", self.number, _e);
                Err(NodeError::ChannelNotFound { channel: self.number })
            }
        }
    }

    /// Read and bias-correct all six axes
    ///
    /// A failed transaction marks the module not ready; the next
    /// successful one marks it ready again.
    pub fn read(&mut self) -> NodeResult<MotionSample> {
        if !self.present {
            return Err(NodeError::ChannelNotFound { channel: self.number });
        }

        match self.sensor.read_raw() {
            Ok(raw) => {
                self.ready = true;
                Ok(MotionSample::corrected(raw, &self.bias))
            }
            Err(_e) => {
                if self.ready {
                    log_warn!("Module {} read failed: {:?}", self.number, _e);
                }
                self.ready = false;
                Err(NodeError::BusTransaction { address: self.address })
            }
        }
    }

    /// Average `iterations` reads at rest into new bias offsets
    ///
    /// Blocks for the whole run. Failed reads are skipped; if none
    /// complete, the previous bias is kept.
    pub fn calibrate<D: Delay>(&mut self, iterations: u16, delay: &mut D) -> CalibrationReport {
        let mut accel_sum = [0i64; 3];
        let mut gyro_sum = [0i64; 3];
        let mut used: u16 = 0;

        if self.present {
            for _ in 0..iterations {
                if let Ok(raw) = self.sensor.read_raw() {
                    accel_sum[0] += i64::from(raw.ax);
                    accel_sum[1] += i64::from(raw.ay);
                    accel_sum[2] += i64::from(raw.az);
                    gyro_sum[0] += i64::from(raw.gx);
                    gyro_sum[1] += i64::from(raw.gy);
                    gyro_sum[2] += i64::from(raw.gz);
                    used += 1;
                }
                delay.delay_ms(CALIBRATION_SAMPLE_DELAY_MS);
            }
        }

        if used > 0 {
            let n = f32::from(used);
            let mean = |sum: i64| sum as f32 / n;
            self.bias = Bias {
                accel: [
                    mean(accel_sum[0]),
                    mean(accel_sum[1]),
                    mean(accel_sum[2]) - self.ranges.accel.lsb_per_g(),
                ],
                gyro: [mean(gyro_sum[0]), mean(gyro_sum[1]), mean(gyro_sum[2])],
            };
        }

        log_info!("Module {} calibrated from {} samples", self.number, used);
        CalibrationReport {
            samples_used: used,
            bias: self.bias,
        }
    }

    /// 1-based module number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Programmed ranges
    pub fn ranges(&self) -> FullScale {
        self.ranges
    }

    /// Bias currently removed from reads
    pub fn bias(&self) -> Bias {
        self.bias
    }

    /// Whether the module answered at boot
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Whether the last bus transaction completed
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}
