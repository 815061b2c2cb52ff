//! Byte transports between host and node

mod memory;
#[cfg(feature = "serial")]
mod serial;

pub use memory::MemoryTransport;
#[cfg(feature = "serial")]
pub use serial::{PortInfo, SerialTransport};

use crate::Result;

/// Bidirectional byte stream to one node
pub trait Transport: Send {
    /// Read available bytes into `buffer`
    ///
    /// Returns 0 when nothing arrived before the transport's read timeout.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write all of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Flush pending writes
    fn flush(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).read(buffer)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
