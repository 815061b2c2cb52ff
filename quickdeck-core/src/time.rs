//! Node clocks
//!
//! Every node timestamps records with its own monotonic clock:
//! milliseconds since that node booted. Clocks of different nodes are
//! never aligned by the core.

pub use crate::traits::TimeSource;

/// Milliseconds since node boot
pub type Timestamp = u64;

/// Monotonic clock backed by `std::time::Instant`
///
/// Starts at 0 when created, which stands in for node boot.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct BootClock {
    boot: std::time::Instant,
}

#[cfg(feature = "std")]
impl BootClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            boot: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for BootClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for BootClock {
    fn now(&self) -> Timestamp {
        self.boot.elapsed().as_millis() as Timestamp
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Elapsed milliseconds between two readings of the same clock
///
/// Saturates at zero if the clock appears to run backwards.
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
