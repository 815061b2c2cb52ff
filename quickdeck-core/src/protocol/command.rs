//! Inbound commands
//!
//! Decoding is node-agnostic: it checks syntax and value sanity only.
//! Whether a command applies to a node kind, and whether a channel index
//! is in range, is decided by the node handling it.

use core::fmt::{self, Write};

use heapless::String;

use crate::{
    constants::protocol::{MAX_COMMAND_LEN, STRAIN_DECIMALS},
    errors::CommandError,
};

/// Encoded command text, without the trailing newline
pub type CommandText = String<MAX_COMMAND_LEN>;

/// One decoded instruction from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Zero every strain channel at the current load
    Tare,
    /// Set the scale factor of one strain channel
    Calibrate {
        /// 1-based channel index
        channel: u8,
        /// Counts per unit, finite and > 0
        factor: f32,
    },
    /// Measure at-rest bias of every inertial module
    CalibrateSensors,
    /// Ask the node to repeat its ready banner
    Identity,
}

impl Command {
    /// Decode one line
    ///
    /// Surrounding whitespace (including the newline) is ignored. An
    /// empty line is not a command and yields `Ok(None)`.
    pub fn decode(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let command = match line {
            "TARE" => Self::Tare,
            "IDENTITY" => Self::Identity,
            "CALIBRATE" => Self::CalibrateSensors,
            _ => match line.strip_prefix("CALIBRATE,") {
                Some(args) => Self::decode_calibrate(args)?,
                None => return Err(CommandError::Unrecognized),
            },
        };

        Ok(Some(command))
    }

    fn decode_calibrate(args: &str) -> Result<Self, CommandError> {
        let (channel, factor) = args.split_once(',').ok_or(CommandError::Malformed {
            reason: "missing factor",
        })?;

        let channel = channel
            .trim()
            .parse::<u8>()
            .map_err(|_| CommandError::Malformed { reason: "bad channel" })?;

        let factor = factor
            .trim()
            .parse::<f32>()
            .map_err(|_| CommandError::Malformed { reason: "bad factor" })?;

        if !factor.is_finite() || factor <= 0.0 {
            return Err(CommandError::InvalidFactor);
        }

        Ok(Self::Calibrate { channel, factor })
    }

    /// Encode into the inbound line grammar
    ///
    /// The widest form, `CALIBRATE,255,<f32::MAX at 6 decimals>`, fits in
    /// [`MAX_COMMAND_LEN`].
    pub fn encode(&self) -> CommandText {
        let mut text = CommandText::new();
        let _ = write!(text, "{}", self);
        text
    }

    /// Command word, as used in logs and rejection reasons
    pub fn word(&self) -> &'static str {
        match self {
            Self::Tare => "TARE",
            Self::Calibrate { .. } | Self::CalibrateSensors => "CALIBRATE",
            Self::Identity => "IDENTITY",
        }
    }
}

/// Wire form, without the trailing newline
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calibrate { channel, factor } => {
                write!(f, "CALIBRATE,{},{:.*}", channel, STRAIN_DECIMALS, factor)
            }
            other => f.write_str(other.word()),
        }
    }
}
