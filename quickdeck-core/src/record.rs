//! Records: one timestamped snapshot per scheduler tick
//!
//! A record is built by the node at a tick, encoded once into a frame and
//! then dropped. The core keeps no history of records.

use heapless::Vec;

use crate::{
    constants::channels::{MOTION_RECORD_MODULES, STRAIN_CHANNEL_COUNT},
    fusion::Orientation,
    time::Timestamp,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strain node snapshot
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrainRecord {
    /// Milliseconds since node boot
    pub timestamp: Timestamp,
    /// Calibrated reading per channel, `0.0` for channels not ready
    pub values: Vec<f32, STRAIN_CHANNEL_COUNT>,
}

/// Motion node snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionRecord {
    /// Milliseconds since node boot
    pub timestamp: Timestamp,
    /// Two fused modules followed by the synthesized module
    pub modules: [Orientation; MOTION_RECORD_MODULES],
}

/// Snapshot from either node kind
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Record {
    /// Strain channel readings
    Strain(StrainRecord),
    /// Module orientations
    Motion(MotionRecord),
}

impl Record {
    /// Milliseconds since the producing node booted
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Strain(record) => record.timestamp,
            Self::Motion(record) => record.timestamp,
        }
    }
}

impl From<StrainRecord> for Record {
    fn from(record: StrainRecord) -> Self {
        Self::Strain(record)
    }
}

impl From<MotionRecord> for Record {
    fn from(record: MotionRecord) -> Self {
        Self::Motion(record)
    }
}
