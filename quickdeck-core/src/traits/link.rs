//! Host link traits
//!
//! A node talks to the host over one byte stream. Reads follow the `nb`
//! pull model: the node loop polls for a byte and gets
//! `nb::Error::WouldBlock` when nothing has arrived, so reading never
//! stalls sampling.
//!
//! ```rust
//! use quickdeck_core::traits::Link;
//!
//! fn drain<L: Link>(link: &mut L) -> usize {
//!     let mut count = 0;
//!     loop {
//!         match link.read_byte() {
//!             Ok(_) => count += 1,
//!             Err(nb::Error::WouldBlock) => return count,
//!             Err(nb::Error::Other(_)) => return count,
//!         }
//!     }
//! }
//! ```

use core::fmt::Debug;

use crate::protocol::Frame;

/// Byte stream between one node and the host
pub trait Link {
    /// Transport failure type
    type Error: Debug;

    /// Take the next received byte, if any
    ///
    /// Returns:
    /// - `Ok(byte)` - A byte was waiting
    /// - `Err(nb::Error::WouldBlock)` - Nothing received yet
    /// - `Err(nb::Error::Other(e))` - Transport error
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Write `line` followed by a newline
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

/// Destination for frames produced while handling a command
///
/// Handlers emit frames as they go so that a start acknowledgement
/// reaches the host before a long calibration begins.
pub trait FrameSink {
    /// Send one frame
    fn emit(&mut self, frame: &Frame);
}

#[cfg(feature = "std")]
impl FrameSink for std::vec::Vec<Frame> {
    fn emit(&mut self, frame: &Frame) {
        self.push(frame.clone());
    }
}

impl<const N: usize> FrameSink for heapless::Vec<Frame, N> {
    fn emit(&mut self, frame: &Frame) {
        // Full sink drops the frame, same as a saturated UART buffer
        let _ = self.push(frame.clone());
    }
}
