//! Bounded line assembly
//!
//! Collects link bytes until a newline. A partial line stays buffered
//! across polls until its newline arrives.
//!
//! A line longer than the buffer is dropped whole: the buffer discards
//! everything up to the next newline, reports one overflow, and starts
//! clean. Memory use never grows past `N` bytes.
//!
//! ```text
//! bytes:   T A R E \n  C A L I B ... (70 bytes) ... \n  I D ...
//! events:          ↑                                 ↑
//!              Ok("TARE")                  Err(LineOverflow)
//! ```

use heapless::{String, Vec};

use crate::errors::NodeError;

/// Assembled line, without its terminator
pub type Line<const N: usize> = String<N>;

/// Fixed-capacity newline framer
#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const N: usize> {
    buffer: Vec<u8, N>,
    /// Dropping bytes until the next newline
    discarding: bool,
}

impl<const N: usize> LineBuffer<N> {
    /// Empty buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feed one byte
    ///
    /// Returns `Some` when the byte completes a line:
    /// - `Ok(line)` with a trailing `\r` removed
    /// - `Err(NodeError::LineOverflow)` if the line did not fit
    /// - `Err(NodeError::MalformedLine)` if it was not valid UTF-8
    pub fn push(&mut self, byte: u8) -> Option<Result<Line<N>, NodeError>> {
        if byte == b'\n' {
            return Some(self.finish());
        }

        if self.discarding {
            return None;
        }

        if self.buffer.push(byte).is_err() {
            log_warn!("Line exceeded {} bytes, discarding", N);
            self.buffer.clear();
            self.discarding = true;
        }
        None
    }

    /// Bytes held for the current partial line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Whether an oversized line is being skipped
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Drop any partial line
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    fn finish(&mut self) -> Result<Line<N>, NodeError> {
        if self.discarding {
            self.clear();
            return Err(NodeError::LineOverflow { limit: N });
        }

        if self.buffer.last() == Some(&b'\r') {
            self.buffer.pop();
        }

        let bytes = core::mem::take(&mut self.buffer);
        String::from_utf8(bytes).map_err(|_| NodeError::MalformedLine)
    }
}
