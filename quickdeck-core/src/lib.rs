//! Acquisition core for QuickDeck sensor nodes
//!
//! Runs the sampling, fusion and command handling of the two node kinds
//! that feed a QuickDeck host over a serial link:
//!
//! - **Strain node**: eight bridge amplifier channels sampled at 10 Hz
//! - **Motion node**: two accelerometer/gyroscope modules fused into
//!   pitch/roll/yaw at 100 Hz, plus one synthesized module
//!
//! Key constraints:
//! - Single sequential control loop per node, no locking
//! - No heap allocation (runs on small microcontrollers)
//! - Nothing on the sampling path is fatal
//!
//! ```ignore
//! use quickdeck_core::{
//!     node::{NodeLoop, StrainNode, StrainConfig},
//!     mock::{MockAmplifier, MemoryLink},
//! };
//!
//! let amplifiers = [(); 8].map(|_| MockAmplifier::new().0);
//! let node = StrainNode::new(amplifiers, StrainConfig::default());
//! let mut node_loop = NodeLoop::new(node, MemoryLink::new());
//!
//! node_loop.boot();
//! let mut now = 0;
//! loop {
//!     node_loop.poll(now);
//!     now += 1;
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(all(not(feature = "std"), any(test, feature = "mock")))]
extern crate std;

#[macro_use]
mod logging;

pub mod channel;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod fusion;
pub mod node;
pub mod protocol;
pub mod record;
pub mod scheduler;
pub mod time;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Public API
pub use errors::{CommandError, DecodeError, NodeError};
pub use fusion::{ComplementaryFilter, FusionConfig, Orientation, SynthesizedChannel};
pub use node::{NodeKind, NodeLoop, MotionNode, StrainNode};
pub use protocol::{Command, Frame};
pub use record::{MotionRecord, Record, StrainRecord};
pub use scheduler::{SampleScheduler, Tick};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
