//! In-process transport for tests and simulators

use super::Transport;
use crate::{LinkError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Pipe {
    bytes: VecDeque<u8>,
    closed: bool,
}

fn lock(pipe: &Mutex<Pipe>) -> MutexGuard<'_, Pipe> {
    pipe.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One end of an in-memory byte pipe
///
/// Created in pairs: what one end writes, the other reads. Dropping
/// either end closes both directions; the survivor can still drain bytes
/// already written, then reads fail with [`LinkError::Closed`].
#[derive(Debug)]
pub struct MemoryTransport {
    inbound: Arc<Mutex<Pipe>>,
    outbound: Arc<Mutex<Pipe>>,
}

impl MemoryTransport {
    /// Two connected ends
    pub fn pair() -> (Self, Self) {
        let a = Arc::new(Mutex::new(Pipe::default()));
        let b = Arc::new(Mutex::new(Pipe::default()));
        (
            Self {
                inbound: Arc::clone(&a),
                outbound: Arc::clone(&b),
            },
            Self {
                inbound: b,
                outbound: a,
            },
        )
    }

    /// Write a string, for scripting the node side in tests
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write_all(text.as_bytes())
    }

    /// Everything readable right now, as text
    pub fn read_to_string(&mut self) -> Result<String> {
        let mut pipe = lock(&self.inbound);
        let bytes: Vec<u8> = pipe.bytes.drain(..).collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut pipe = lock(&self.inbound);
        if pipe.bytes.is_empty() && pipe.closed {
            return Err(LinkError::Closed);
        }

        let count = pipe.bytes.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(pipe.bytes.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut pipe = lock(&self.outbound);
        if pipe.closed {
            return Err(LinkError::Closed);
        }
        pipe.bytes.extend(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        lock(&self.inbound).closed = true;
        lock(&self.outbound).closed = true;
    }
}
