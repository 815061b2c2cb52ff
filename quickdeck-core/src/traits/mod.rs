//! Hardware and transport seams
//!
//! The core never touches pins, buses or UARTs directly. Each node is
//! generic over these traits so the same sampling and fusion code runs on
//! a microcontroller, in a simulator, and in tests.
//!
//! ## Module Organization
//!
//! - [`hardware`] - Strain amplifiers, motion sensors and blocking delays
//! - [`link`] - Byte link to the host and the frame sink used by handlers
//! - [`node`] - Sampling and command handling of one node kind
//! - [`time`] - Millisecond clock since node boot

pub mod hardware;
pub mod link;
pub mod node;
pub mod time;

pub use hardware::{Delay, MotionSensor, StrainAmplifier};
pub use link::{FrameSink, Link};
pub use node::{CommandHandler, Node};
pub use time::TimeSource;
