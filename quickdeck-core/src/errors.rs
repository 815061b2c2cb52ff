//! Error types for node operation and the line protocol
//!
//! All errors are small `Copy` values with `&'static str` reasons so they
//! can be returned from the sampling path without allocation.
//!
//! ## Error Categories
//!
//! ### Sensor faults ([`NodeError`])
//! - A strain channel that was not found at boot or has no conversion ready
//! - An inertial bus transaction that did not complete
//!
//! These never abort a record. Strain channels substitute the sentinel `0`,
//! inertial modules hold their previous orientation.
//!
//! ### Malformed commands ([`CommandError`])
//! Unparsable input, out-of-range channels and commands the node kind does
//! not understand. The dispatcher drops them without mutating any state.
//!
//! ### Undecodable frames ([`DecodeError`])
//! Host-side failures to parse a node's output line.

use thiserror_no_std::Error;

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Faults raised by channel drivers and the node loop
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    /// Probe at boot found no device behind the channel
    #[error("Channel {channel} not found")]
    ChannelNotFound {
        /// 1-based channel number
        channel: u8,
    },

    /// Amplifier has not signaled a finished conversion
    #[error("Channel {channel} not ready")]
    ChannelNotReady {
        /// 1-based channel number
        channel: u8,
    },

    /// Inertial module bus read did not complete
    #[error("Bus transaction with 0x{address:02x} failed")]
    BusTransaction {
        /// Bus address of the module
        address: u8,
    },

    /// Inbound line exceeded the buffer and was discarded
    #[error("Line longer than {limit} bytes discarded")]
    LineOverflow {
        /// Buffer capacity in bytes
        limit: usize,
    },

    /// Inbound line was not valid UTF-8
    #[error("Line is not valid text")]
    MalformedLine,
}

/// Reasons a command line is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Line does not start with a known command word
    #[error("Unrecognized command")]
    Unrecognized,

    /// Arguments could not be parsed
    #[error("Malformed arguments: {reason}")]
    Malformed {
        /// What was wrong with the arguments
        reason: &'static str,
    },

    /// Channel index outside `[1, count]`
    #[error("Channel {channel} outside [1, {count}]")]
    ChannelOutOfRange {
        /// Requested 1-based channel
        channel: u8,
        /// Channels on this node
        count: u8,
    },

    /// Calibration factor is not finite or not strictly positive
    #[error("Calibration factor must be finite and positive")]
    InvalidFactor,

    /// Command is valid but not for this node kind
    #[error("{command} not supported by this node")]
    Unsupported {
        /// Command word
        command: &'static str,
    },
}

impl CommandError {
    /// Short machine-readable reason used in `ERROR,<reason>` frames
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unrecognized => "UNRECOGNIZED",
            Self::Malformed { .. } => "MALFORMED",
            Self::ChannelOutOfRange { .. } => "CHANNEL_OUT_OF_RANGE",
            Self::InvalidFactor => "INVALID_FACTOR",
            Self::Unsupported { .. } => "UNSUPPORTED",
        }
    }
}

/// Failures decoding a node's outbound line
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Line was empty after trimming
    #[error("Empty line")]
    Empty,

    /// Line matches none of the outbound frame forms
    #[error("Unknown frame")]
    UnknownFrame,

    /// Record carried the wrong number of fields
    #[error("Expected {expected} fields, found {found}")]
    FieldCount {
        /// Fields the frame kind requires
        expected: usize,
        /// Fields present in the line
        found: usize,
    },

    /// Field could not be parsed as a number
    #[error("Field {index} is not a valid number")]
    InvalidNumber {
        /// 0-based field position
        index: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for NodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ChannelNotFound { channel } =>
                defmt::write!(fmt, "Channel {} not found", channel),
            Self::ChannelNotReady { channel } =>
                defmt::write!(fmt, "Channel {} not ready", channel),
            Self::BusTransaction { address } =>
                defmt::write!(fmt, "Bus transaction with {:x} failed", address),
            Self::LineOverflow { limit } =>
                defmt::write!(fmt, "Line over {} bytes", limit),
            Self::MalformedLine =>
                defmt::write!(fmt, "Line is not valid text"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Command rejected: {}", self.reason())
    }
}
