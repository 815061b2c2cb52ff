//! Host-side links to QuickDeck nodes
//!
//! ## Overview
//!
//! A QuickDeck rig has two nodes on two serial ports: a strain node
//! streaming eight calibrated channels at 10 Hz and a motion node streaming
//! three orientations at 100 Hz. This crate is the host end of those
//! ports.
//!
//! ```text
//!  strain node ── Transport ── NodeLink ─┐
//!                                        ├─ Acquisition ── mpsc ── Sample
//!  motion node ── Transport ── NodeLink ─┘
//! ```
//!
//! ## Layers
//!
//! ### Transport
//!
//! Moves bytes. [`SerialTransport`] opens a real port at 115200 8-N-1
//! (feature `serial`); [`MemoryTransport`] is an in-process pipe used by
//! tests and simulators. A read that times out returns 0 bytes, never an
//! error.
//!
//! ### NodeLink
//!
//! Speaks the line protocol over one transport:
//! - `connect` sends `IDENTITY` and waits for the expected ready banner
//! - `poll` assembles lines and decodes them into [`NodeMessage`]s
//! - `send` refuses commands the node kind would drop, then writes them
//!
//! Lines that do not decode are skipped and counted, never fatal.
//!
//! ### Acquisition
//!
//! Runs both links on Tokio blocking tasks and funnels their records into
//! one bounded channel. Records keep the producing node's own timestamp;
//! the two nodes' clocks are not aligned.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use quickdeck_link::{Acquisition, AcquisitionConfig, LinkConfig, NodeKind, NodeLink, SerialTransport};
//!
//! let config = LinkConfig::default();
//! let strain = NodeLink::connect(SerialTransport::open("/dev/ttyACM0", config.baud_rate)?, NodeKind::Strain, config.clone())?;
//! let motion = NodeLink::connect(SerialTransport::open("/dev/ttyACM1", config.baud_rate)?, NodeKind::Motion, config)?;
//!
//! let mut acquisition = Acquisition::start(strain, motion, AcquisitionConfig::default());
//! while let Some(sample) = acquisition.next_sample().await {
//!     println!("{}", sample.to_json()?);
//! }
//! ```

pub mod acquisition;
pub mod link;
pub mod transport;

pub use acquisition::{Acquisition, AcquisitionConfig, AcquisitionStats, Sample};
pub use link::{Ack, LinkConfig, NodeLink, NodeMessage};
#[cfg(feature = "serial")]
pub use transport::{PortInfo, SerialTransport};
pub use transport::{MemoryTransport, Transport};

pub use quickdeck_core::{Command, NodeKind, Record};

use quickdeck_core::CommandError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, LinkError>;

/// Host link errors
#[derive(Debug, Error)]
pub enum LinkError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// No matching banner arrived in time
    #[error("No {expected:?} banner within {timeout_ms} ms")]
    HandshakeTimeout {
        /// Kind that was asked for
        expected: NodeKind,
        /// Handshake budget
        timeout_ms: u64,
    },

    /// The port is wired to the other node
    #[error("Expected {expected:?} node, found {found:?}")]
    WrongNode {
        /// Kind that was asked for
        expected: NodeKind,
        /// Kind that answered
        found: NodeKind,
    },

    /// Command does not exist on this node kind
    #[error("{command} is not supported by the {kind:?} node")]
    Unsupported {
        /// Command word
        command: &'static str,
        /// Node the command was meant for
        kind: NodeKind,
    },

    /// Command would be dropped by the node
    #[error("Command rejected: {0}")]
    Rejected(CommandError),

    /// Peer went away
    #[error("Transport closed")]
    Closed,

    /// Bad configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A background reader panicked or was cancelled
    #[error("Reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<serde_json::Error> for LinkError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Counters for one link
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Complete lines received
    pub lines_read: u64,
    /// Records decoded
    pub samples_decoded: u64,
    /// Lines skipped because they did not decode
    pub undecodable_lines: u64,
    /// Command lines written
    pub commands_sent: u64,
}
