//! Shared fixtures for node integration tests
//!
//! - Node builders over the in-memory hardware doubles
//! - A simulated clock stepping the loop in fixed increments
//! - Tolerance assertions for fused angles and parsed records

#![allow(dead_code)]

use quickdeck_core::{
    channel::RawMotion,
    mock::{AmplifierHandle, MemoryLink, MockAmplifier, MockMotionSensor, MotionHandle, NoDelay},
    node::{MotionConfig, MotionNode, NodeLoop, StrainConfig, StrainNode},
    time::{FixedTime, TimeSource},
    Frame, Record,
};

pub type StrainLoop = NodeLoop<StrainNode<MockAmplifier>, MemoryLink>;
pub type MotionLoop = NodeLoop<MotionNode<MockMotionSensor, NoDelay>, MemoryLink>;

/// Raw axes of a module lying flat and still at ±2 g / ±250 °/s
pub const LEVEL: RawMotion = RawMotion {
    ax: 0,
    ay: 0,
    az: 16384,
    gx: 0,
    gy: 0,
    gz: 0,
};

/// Assert two floats agree within an absolute tolerance
#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($actual, $expected, $tolerance);
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} = {}, expected {} ± {}",
            stringify!($actual),
            actual,
            expected,
            tolerance
        );
    }};
}

/// Strain loop with every amplifier reading `raw`
pub fn strain_loop(config: StrainConfig, raw: i32) -> (StrainLoop, Vec<AmplifierHandle>) {
    let mut handles = Vec::new();
    let amplifiers = [(); 8].map(|_| {
        let (amplifier, handle) = MockAmplifier::new();
        handle.set_raw(raw);
        handles.push(handle);
        amplifier
    });
    let node = StrainNode::new(amplifiers, config);
    (NodeLoop::new(node, MemoryLink::new()), handles)
}

/// Motion loop with both modules level and still
pub fn motion_loop(config: MotionConfig) -> (MotionLoop, [MotionHandle; 2]) {
    let (first, first_handle) = MockMotionSensor::new();
    let (second, second_handle) = MockMotionSensor::new();
    first_handle.set_raw(LEVEL);
    second_handle.set_raw(LEVEL);

    let node = MotionNode::new([first, second], NoDelay, config);
    (
        NodeLoop::new(node, MemoryLink::new()),
        [first_handle, second_handle],
    )
}

/// Drives a node loop from a simulated millisecond clock
pub struct SimClock {
    time: FixedTime,
    step_ms: u64,
}

impl SimClock {
    /// Clock at boot, advancing `step_ms` per loop iteration
    pub fn new(step_ms: u64) -> Self {
        Self {
            time: FixedTime::new(0),
            step_ms,
        }
    }

    /// Current time
    pub fn now(&self) -> u64 {
        self.time.now()
    }

    /// Advance one step and return the new time
    pub fn step(&mut self) -> u64 {
        self.time.advance(self.step_ms);
        self.time.now()
    }
}

/// Decode every output line, panicking on anything undecodable
pub fn decode_all(lines: &[String]) -> Vec<Frame> {
    lines
        .iter()
        .map(|line| Frame::decode(line).unwrap_or_else(|e| panic!("{:?}: {}", line, e)))
        .collect()
}

/// Records among decoded frames
pub fn records(frames: &[Frame]) -> Vec<Record> {
    frames
        .iter()
        .filter_map(|frame| match frame {
            Frame::Record(record) => Some(record.clone()),
            _ => None,
        })
        .collect()
}
