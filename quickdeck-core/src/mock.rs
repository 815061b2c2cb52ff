//! In-memory test doubles
//!
//! Hardware doubles come in pairs: the driver half moves into the node,
//! the handle half stays with the test and changes what the driver
//! returns. Handles share state through `Arc`, so they keep working after
//! the node has taken ownership of the driver.
//!
//! ```rust,ignore
//! let (amplifier, handle) = MockAmplifier::new();
//! handle.set_raw(1200);
//! let node = StrainNode::new([amplifier, ...], StrainConfig::default());
//! handle.set_ready(false); // next record reads 0 on this channel
//! ```

use std::{
    collections::VecDeque,
    string::String,
    sync::{
        atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering},
        Arc, Mutex, MutexGuard,
    },
    vec::Vec,
};

use crate::{
    channel::{FullScale, Gain, RawMotion},
    traits::{Delay, Link, MotionSensor, StrainAmplifier},
};

pub use crate::time::FixedTime;

/// Failure raised by a mock driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Device did not answer
    NoResponse,
    /// Transaction failed
    Bus,
}

#[derive(Debug)]
struct AmplifierState {
    raw: AtomicI32,
    ready: AtomicBool,
    present: AtomicBool,
    reads: AtomicU32,
}

/// Bridge amplifier double
#[derive(Debug)]
pub struct MockAmplifier {
    state: Arc<AmplifierState>,
}

/// Controls a [`MockAmplifier`]
#[derive(Debug, Clone)]
pub struct AmplifierHandle {
    state: Arc<AmplifierState>,
}

impl MockAmplifier {
    /// Present, ready amplifier reading 0
    pub fn new() -> (Self, AmplifierHandle) {
        let state = Arc::new(AmplifierState {
            raw: AtomicI32::new(0),
            ready: AtomicBool::new(true),
            present: AtomicBool::new(true),
            reads: AtomicU32::new(0),
        });
        (
            Self {
                state: Arc::clone(&state),
            },
            AmplifierHandle { state },
        )
    }
}

impl StrainAmplifier for MockAmplifier {
    type Error = MockError;

    fn begin(&mut self, _gain: Gain) -> Result<(), MockError> {
        if self.state.present.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(MockError::NoResponse)
        }
    }

    fn is_ready(&mut self) -> bool {
        self.state.present.load(Ordering::Relaxed) && self.state.ready.load(Ordering::Relaxed)
    }

    fn read_raw(&mut self) -> Result<i32, MockError> {
        if !self.state.present.load(Ordering::Relaxed) {
            return Err(MockError::NoResponse);
        }
        self.state.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.state.raw.load(Ordering::Relaxed))
    }
}

impl AmplifierHandle {
    /// Raw count returned by the next reads
    pub fn set_raw(&self, raw: i32) {
        self.state.raw.store(raw, Ordering::Relaxed);
    }

    /// Whether a conversion is available
    pub fn set_ready(&self, ready: bool) {
        self.state.ready.store(ready, Ordering::Relaxed);
    }

    /// Whether the amplifier answers at all
    pub fn set_present(&self, present: bool) {
        self.state.present.store(present, Ordering::Relaxed);
    }

    /// Completed reads so far
    pub fn reads(&self) -> u32 {
        self.state.reads.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct SensorState {
    raw: RawMotion,
    failing: bool,
    absent: bool,
    ranges: Option<FullScale>,
    reads: u32,
}

/// Accelerometer/gyroscope double
#[derive(Debug)]
pub struct MockMotionSensor {
    state: Arc<Mutex<SensorState>>,
}

/// Controls a [`MockMotionSensor`]
#[derive(Debug, Clone)]
pub struct MotionHandle {
    state: Arc<Mutex<SensorState>>,
}

fn lock(state: &Mutex<SensorState>) -> MutexGuard<'_, SensorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockMotionSensor {
    /// Present sensor reading all zeros
    pub fn new() -> (Self, MotionHandle) {
        let state = Arc::new(Mutex::new(SensorState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MotionHandle { state },
        )
    }
}

impl MotionSensor for MockMotionSensor {
    type Error = MockError;

    fn begin(&mut self, ranges: FullScale) -> Result<(), MockError> {
        let mut state = lock(&self.state);
        if state.absent {
            return Err(MockError::NoResponse);
        }
        state.ranges = Some(ranges);
        Ok(())
    }

    fn read_raw(&mut self) -> Result<RawMotion, MockError> {
        let mut state = lock(&self.state);
        if state.absent {
            return Err(MockError::NoResponse);
        }
        if state.failing {
            return Err(MockError::Bus);
        }
        state.reads += 1;
        Ok(state.raw)
    }
}

impl MotionHandle {
    /// Axes returned by the next reads
    pub fn set_raw(&self, raw: RawMotion) {
        lock(&self.state).raw = raw;
    }

    /// Make every read fail until cleared
    pub fn fail_reads(&self, failing: bool) {
        lock(&self.state).failing = failing;
    }

    /// Whether the sensor answers at all
    pub fn set_present(&self, present: bool) {
        lock(&self.state).absent = !present;
    }

    /// Ranges programmed at boot, if booted
    pub fn ranges(&self) -> Option<FullScale> {
        lock(&self.state).ranges
    }

    /// Completed reads so far
    pub fn reads(&self) -> u32 {
        lock(&self.state).reads
    }
}

/// Delay that returns immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

/// Link writes were switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDown;

/// Host link held in memory
#[derive(Debug, Default)]
pub struct MemoryLink {
    input: VecDeque<u8>,
    output: Vec<String>,
    failing: bool,
}

impl MemoryLink {
    /// Empty link
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the node to read
    pub fn push_input(&mut self, text: &str) {
        self.input.extend(text.bytes());
    }

    /// Lines written so far, leaving the link empty
    pub fn take_output(&mut self) -> Vec<String> {
        core::mem::take(&mut self.output)
    }

    /// Lines written so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Bytes not yet read by the node
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Make writes fail until cleared
    pub fn fail_writes(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Link for MemoryLink {
    type Error = LinkDown;

    fn read_byte(&mut self) -> nb::Result<u8, LinkDown> {
        self.input.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkDown> {
        if self.failing {
            return Err(LinkDown);
        }
        self.output.push(String::from(line));
        Ok(())
    }
}
