//! Shared fixtures: core node loops exposed as host transports

#![allow(dead_code)]

use std::collections::VecDeque;

use quickdeck_core::{
    channel::RawMotion,
    mock::{AmplifierHandle, MemoryLink, MockAmplifier, MockMotionSensor, MotionHandle, NoDelay},
    node::{MotionConfig, MotionNode, NodeLoop, StrainConfig, StrainNode},
    time::Timestamp,
    traits::Node,
};
use quickdeck_link::{LinkError, Result, Transport};

/// Module lying flat and still at ±2 g / ±250 °/s
pub const LEVEL: RawMotion = RawMotion {
    ax: 0,
    ay: 0,
    az: 16384,
    gx: 0,
    gy: 0,
    gz: 0,
};

/// A booted node loop behind a byte transport
///
/// Every read advances simulated time by one step and runs one loop
/// iteration, so a node's cadence is measured in reads, not wall time.
pub struct SimulatedNode<N> {
    node_loop: NodeLoop<N, MemoryLink>,
    now: Timestamp,
    step_ms: u64,
    outbound: VecDeque<u8>,
}

impl<N: Node + Send> SimulatedNode<N> {
    fn booted(mut node_loop: NodeLoop<N, MemoryLink>, step_ms: u64) -> Self {
        node_loop.boot();
        Self {
            node_loop,
            now: 0,
            step_ms,
            outbound: VecDeque::new(),
        }
    }

    /// Simulated milliseconds since boot
    pub fn now(&self) -> Timestamp {
        self.now
    }
}

impl SimulatedNode<StrainNode<MockAmplifier>> {
    /// Strain node with every channel reading `raw`
    pub fn strain(raw: i32, step_ms: u64) -> (Self, Vec<AmplifierHandle>) {
        let mut handles = Vec::new();
        let amplifiers = [(); 8].map(|_| {
            let (amplifier, handle) = MockAmplifier::new();
            handle.set_raw(raw);
            handles.push(handle);
            amplifier
        });
        let node = StrainNode::new(amplifiers, StrainConfig::default());
        (Self::booted(NodeLoop::new(node, MemoryLink::new()), step_ms), handles)
    }
}

impl SimulatedNode<MotionNode<MockMotionSensor, NoDelay>> {
    /// Level motion node with a short calibration
    pub fn motion(step_ms: u64) -> (Self, [MotionHandle; 2]) {
        let (first, first_handle) = MockMotionSensor::new();
        let (second, second_handle) = MockMotionSensor::new();
        first_handle.set_raw(LEVEL);
        second_handle.set_raw(LEVEL);

        let config = MotionConfig::default().with_calibration_iterations(10);
        let node = MotionNode::new([first, second], NoDelay, config);
        (
            Self::booted(NodeLoop::new(node, MemoryLink::new()), step_ms),
            [first_handle, second_handle],
        )
    }
}

impl<N: Node + Send> Transport for SimulatedNode<N> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if self.outbound.is_empty() {
            self.now += self.step_ms;
            self.node_loop.poll(self.now);
            for line in self.node_loop.link_mut().take_output() {
                self.outbound.extend(line.bytes());
                self.outbound.push_back(b'\n');
            }
        }

        let count = self.outbound.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(self.outbound.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(data)
            .map_err(|e| LinkError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        self.node_loop.link_mut().push_input(text);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Assert two floats agree within `tol`
#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (actual, expected, tol) = ($actual as f64, $expected as f64, $tol as f64);
        assert!(
            (actual - expected).abs() <= tol,
            "{} not within {} of {}",
            actual,
            tol,
            expected
        );
    }};
}
