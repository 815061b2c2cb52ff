//! Time source abstraction
//!
//! Nodes timestamp records with milliseconds since their own boot. The
//! trait lets tests drive the scheduler with a hand-controlled clock.

use crate::time::Timestamp;

/// Source of node time
///
/// ## Implementation Requirements
///
/// - `now()` must be monotonic: it never returns a smaller value than a
///   previous call
/// - The epoch is node boot, not wall clock time
///
/// ## Example Implementation
///
/// ```rust
/// use quickdeck_core::traits::TimeSource;
/// use quickdeck_core::time::Timestamp;
///
/// struct TickCounter {
///     ticks: u64,
/// }
///
/// impl TimeSource for TickCounter {
///     fn now(&self) -> Timestamp {
///         self.ticks
///     }
///
///     fn precision_ms(&self) -> u32 {
///         1
///     }
/// }
/// ```
pub trait TimeSource {
    /// Milliseconds since node boot
    fn now(&self) -> Timestamp;

    /// Smallest step the clock can resolve, in milliseconds
    fn precision_ms(&self) -> u32;
}
