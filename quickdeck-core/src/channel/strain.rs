//! Strain amplifier channel
//!
//! Converts raw bridge counts into calibrated readings:
//!
//! ```text
//! reading = (raw_count - zero_offset) / scale
//! ```
//!
//! - `tare()` makes the current raw count the new zero
//! - `set_scale()` stores the calibration factor (counts per unit)
//! - A channel with no conversion ready reads as the sentinel `0.0`
//!   instead of stalling the record

use crate::{
    constants::channels::DEFAULT_SCALE_FACTOR,
    errors::{NodeError, NodeResult},
    traits::StrainAmplifier,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Amplifier input and gain selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Gain {
    /// Channel A, gain 128
    #[default]
    A128,
    /// Channel A, gain 64
    A64,
    /// Channel B, gain 32
    B32,
}

impl Gain {
    /// Numeric gain factor
    pub fn factor(self) -> u8 {
        match self {
            Self::A128 => 128,
            Self::A64 => 64,
            Self::B32 => 32,
        }
    }

    /// Gain setting for a numeric factor, if the amplifier supports it
    pub fn from_factor(factor: u8) -> Option<Self> {
        match factor {
            128 => Some(Self::A128),
            64 => Some(Self::A64),
            32 => Some(Self::B32),
            _ => None,
        }
    }
}

/// Data/clock pin identifiers of one amplifier
///
/// Opaque to the core; only the board layer gives them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinPair {
    /// Data (DOUT) pin
    pub data: u8,
    /// Clock (SCK) pin
    pub clock: u8,
}

impl PinPair {
    /// Pin pair from data and clock identifiers
    pub const fn new(data: u8, clock: u8) -> Self {
        Self { data, clock }
    }
}

/// One strain gauge amplifier channel
#[derive(Debug)]
pub struct StrainChannel<A> {
    /// 1-based channel number on the node
    number: u8,
    amplifier: A,
    pins: PinPair,
    gain: Gain,
    /// Raw count treated as zero load
    zero_offset: i32,
    /// Counts per unit; always finite and > 0
    scale: f32,
    /// Amplifier answered at boot
    ready: bool,
}

impl<A: StrainAmplifier> StrainChannel<A> {
    /// Wrap an amplifier as channel `number`
    ///
    /// The channel starts not ready with zero offset and unit scale.
    pub fn new(number: u8, amplifier: A, pins: PinPair, gain: Gain) -> Self {
        Self {
            number,
            amplifier,
            pins,
            gain,
            zero_offset: 0,
            scale: DEFAULT_SCALE_FACTOR,
            ready: false,
        }
    }

    /// Power up the amplifier and record whether it was found
    pub fn begin(&mut self) -> NodeResult<()> {
        match self.amplifier.begin(self.gain) {
            Ok(()) => {
                self.ready = true;
                log_info!("Strain channel {} initialized", self.number);
                Ok(())
            }
            Err(_e) => {
                self.ready = false;
                log_warn!("Strain channel {} not found: {:?}", self.number, _e);
                Err(NodeError::ChannelNotFound { channel: self.number })
            }
        }
    }

    /// True when the channel was found and a conversion is available
    pub fn is_ready(&mut self) -> bool {
        self.ready && self.amplifier.is_ready()
    }

    /// Make the current raw count the zero reference
    ///
    /// A channel with no conversion ready keeps its previous offset.
    pub fn tare(&mut self) {
        match self.read_count() {
            Ok(raw) => self.zero_offset = raw,
            Err(_e) => log_debug!("Tare skipped: {}", _e),
        }
    }

    /// Store a calibration factor
    ///
    /// Non-finite or non-positive factors are ignored so the scale stays
    /// strictly positive.
    pub fn set_scale(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale = factor;
        }
    }

    /// Calibrated reading, or the error that made it unavailable
    pub fn try_read(&mut self) -> NodeResult<f32> {
        let raw = self.read_count()?;
        let counts = i64::from(raw) - i64::from(self.zero_offset);
        Ok(counts as f32 / self.scale)
    }

    /// Calibrated reading with the sentinel `0.0` when unavailable
    pub fn read(&mut self) -> f32 {
        self.try_read().unwrap_or(0.0)
    }

    /// 1-based channel number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Whether the amplifier answered at boot
    pub fn is_present(&self) -> bool {
        self.ready
    }

    /// Current calibration factor
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Current zero offset in raw counts
    pub fn zero_offset(&self) -> i32 {
        self.zero_offset
    }

    /// Pin identifiers
    pub fn pins(&self) -> PinPair {
        self.pins
    }

    /// Gain setting
    pub fn gain(&self) -> Gain {
        self.gain
    }

    fn read_count(&mut self) -> NodeResult<i32> {
        if !self.is_ready() {
            return Err(NodeError::ChannelNotReady { channel: self.number });
        }

        self.amplifier
            .read_raw()
            .map_err(|_| NodeError::ChannelNotReady { channel: self.number })
    }
}
