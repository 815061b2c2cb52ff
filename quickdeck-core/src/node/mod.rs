//! Acquisition nodes
//!
//! A node owns its channels, its scheduler and its command dispatcher and
//! runs them from one sequential loop:
//!
//! ```text
//!            ┌──────────── NodeLoop::poll(now) ────────────┐
//!            │                                             │
//! scheduler ─┤ tick? ──→ Node::sample ──→ Frame ──→ Link   │
//!            │                                             │
//! link ──────┤ byte ──→ LineBuffer ──→ Dispatcher ──→ Node │
//!            └─────────────────────────────────────────────┘
//! ```
//!
//! ## Node kinds
//!
//! - [`StrainNode`] - eight bridge amplifier channels, 10 Hz
//! - [`MotionNode`] - two fused inertial modules and one synthesized
//!   module, 100 Hz

pub mod motion;
pub mod runner;
pub mod strain;

pub use motion::{MotionConfig, MotionNode};
pub use runner::{NodeLoop, NodeStats};
pub use strain::{StrainConfig, StrainNode};

use crate::{
    constants::{
        channels::{MOTION_MODULE_COUNT, STRAIN_CHANNEL_COUNT},
        protocol::{MOTION_BANNER, STRAIN_BANNER},
        sampling::{MOTION_SAMPLE_INTERVAL_MS, STRAIN_SAMPLE_INTERVAL_MS},
    },
    errors::CommandError,
    protocol::Command,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    /// Strain gauge amplifier node
    Strain,
    /// Inertial motion node
    Motion,
}

impl NodeKind {
    /// Ready banner sent at boot and in reply to `IDENTITY`
    pub fn banner(self) -> &'static str {
        match self {
            Self::Strain => STRAIN_BANNER,
            Self::Motion => MOTION_BANNER,
        }
    }

    /// Word used in init lines (`Channel 3 initialized`)
    pub fn channel_label(self) -> &'static str {
        match self {
            Self::Strain => "Channel",
            Self::Motion => "Sensor",
        }
    }

    /// Physical channels probed at boot
    pub fn channel_count(self) -> usize {
        match self {
            Self::Strain => STRAIN_CHANNEL_COUNT,
            Self::Motion => MOTION_MODULE_COUNT,
        }
    }

    /// Default record interval
    pub fn sample_interval_ms(self) -> u64 {
        match self {
            Self::Strain => STRAIN_SAMPLE_INTERVAL_MS,
            Self::Motion => MOTION_SAMPLE_INTERVAL_MS,
        }
    }

    /// Whether a node of this kind would apply `command`
    ///
    /// Used by the host to refuse a command before it goes on the wire.
    pub fn validate(self, command: &Command) -> Result<(), CommandError> {
        match (self, command) {
            (_, Command::Identity) => Ok(()),
            (Self::Strain, Command::Tare) | (Self::Motion, Command::CalibrateSensors) => Ok(()),
            (Self::Strain, Command::Calibrate { channel, .. }) => {
                let count = STRAIN_CHANNEL_COUNT as u8;
                if (1..=count).contains(channel) {
                    Ok(())
                } else {
                    Err(CommandError::ChannelOutOfRange {
                        channel: *channel,
                        count,
                    })
                }
            }
            _ => Err(CommandError::Unsupported {
                command: command.word(),
            }),
        }
    }
}
