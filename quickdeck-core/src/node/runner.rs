//! Sequential node control loop
//!
//! Every call to [`NodeLoop::poll`] does two non-blocking checks in a
//! fixed order:
//!
//! 1. Is it time to sample? Emit one record.
//! 2. Has a full command line arrived? Dispatch it.
//!
//! Sampling is never preempted by command handling. The only blocking
//! path is a calibration command, which holds the loop until it is done.
//! No error stops the loop; failures are logged and counted.

use crate::{
    constants::protocol::MAX_COMMAND_LEN,
    dispatcher::{DispatchConfig, Dispatcher},
    errors::NodeError,
    protocol::{Frame, LineBuffer},
    scheduler::SampleScheduler,
    time::Timestamp,
    traits::{FrameSink, Link, Node},
};

/// Counters for one node loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    /// Records written to the link
    pub records_emitted: u32,
    /// Commands applied
    pub commands_applied: u32,
    /// Commands rejected
    pub commands_dropped: u32,
    /// Inbound lines dropped for length or encoding
    pub line_overflows: u32,
    /// Frames the link failed to write
    pub link_write_failures: u32,
    /// Link read errors
    pub link_read_errors: u32,
    /// Sensor reads that failed
    pub read_failures: u32,
}

/// Frame sink writing straight to the link
struct LinkSink<'a, L: Link> {
    link: &'a mut L,
    failures: &'a mut u32,
}

impl<L: Link> FrameSink for LinkSink<'_, L> {
    fn emit(&mut self, frame: &Frame) {
        if let Err(_e) = self.link.write_line(frame.encode().as_str()) {
            *self.failures = self.failures.wrapping_add(1);
            log_warn!("Link write failed: {:?}", _e);
        }
    }
}

/// One node wired to its host link
///
/// ## Usage
///
/// ```rust,ignore
/// let mut node_loop = NodeLoop::new(node, link);
/// node_loop.boot();
///
/// loop {
///     node_loop.poll(clock.now());
/// }
/// ```
#[derive(Debug)]
pub struct NodeLoop<N, L> {
    node: N,
    link: L,
    lines: LineBuffer<MAX_COMMAND_LEN>,
    scheduler: SampleScheduler,
    dispatcher: Dispatcher,
    stats: NodeStats,
    ready: bool,
}

impl<N: Node, L: Link> NodeLoop<N, L> {
    /// Loop with silent rejection of bad commands
    pub fn new(node: N, link: L) -> Self {
        Self::with_config(node, link, DispatchConfig::default())
    }

    /// Loop with explicit dispatcher settings
    pub fn with_config(node: N, link: L, config: DispatchConfig) -> Self {
        let scheduler = SampleScheduler::new(node.sample_interval_ms());
        Self {
            node,
            link,
            lines: LineBuffer::new(),
            scheduler,
            dispatcher: Dispatcher::new(config),
            stats: NodeStats::default(),
            ready: false,
        }
    }

    /// Probe channels, then announce readiness
    ///
    /// Emits one init line per physical channel followed by the banner.
    pub fn boot(&mut self) {
        let mut sink = LinkSink {
            link: &mut self.link,
            failures: &mut self.stats.link_write_failures,
        };
        self.node.boot(&mut sink);
        sink.emit(&Frame::Banner(self.node.kind()));
        self.ready = true;
        log_info!("{:?} node ready", self.node.kind());
    }

    /// Run one loop iteration at `now`
    pub fn poll(&mut self, now: Timestamp) {
        if let Some(tick) = self.scheduler.tick(now) {
            let record = self.node.sample(tick);
            let mut sink = LinkSink {
                link: &mut self.link,
                failures: &mut self.stats.link_write_failures,
            };
            sink.emit(&Frame::Record(record));
            self.stats.records_emitted = self.stats.records_emitted.wrapping_add(1);
        }

        self.poll_command();
    }

    /// Drain link bytes until one line is dispatched or none are waiting
    fn poll_command(&mut self) {
        loop {
            let byte = match self.link.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return,
                Err(nb::Error::Other(_e)) => {
                    self.stats.link_read_errors = self.stats.link_read_errors.wrapping_add(1);
                    log_warn!("Link read failed: {:?}", _e);
                    return;
                }
            };

            let line = match self.lines.push(byte) {
                None => continue,
                Some(Ok(line)) => line,
                Some(Err(NodeError::LineOverflow { .. })) | Some(Err(NodeError::MalformedLine)) => {
                    self.stats.line_overflows = self.stats.line_overflows.wrapping_add(1);
                    return;
                }
                Some(Err(_)) => return,
            };

            let mut sink = LinkSink {
                link: &mut self.link,
                failures: &mut self.stats.link_write_failures,
            };
            let _ = self.dispatcher.dispatch(&line, &mut self.node, &mut sink);
            return;
        }
    }

    /// Whether `boot` has run and the banner was sent
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Counters since boot
    pub fn stats(&self) -> NodeStats {
        NodeStats {
            commands_applied: self.dispatcher.applied(),
            commands_dropped: self.dispatcher.dropped(),
            read_failures: self.node.read_failures(),
            ..self.stats
        }
    }

    /// The node
    pub fn node(&self) -> &N {
        &self.node
    }

    /// The node, for direct inspection in tests and tools
    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    /// The host link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// The host link, for feeding input in tests and simulators
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Split into node and link
    pub fn into_parts(self) -> (N, L) {
        (self.node, self.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mock::{AmplifierHandle, MemoryLink, MockAmplifier, MockMotionSensor, NoDelay},
        node::{MotionConfig, MotionNode, StrainConfig, StrainNode},
    };

    fn strain_loop() -> (NodeLoop<StrainNode<MockAmplifier>, MemoryLink>, std::vec::Vec<AmplifierHandle>) {
        let mut handles = std::vec::Vec::new();
        let amplifiers = [(); 8].map(|_| {
            let (amp, handle) = MockAmplifier::new();
            handles.push(handle);
            amp
        });
        let node = StrainNode::new(amplifiers, StrainConfig::default());
        (NodeLoop::new(node, MemoryLink::new()), handles)
    }

    #[test]
    fn boot_emits_init_lines_then_banner() {
        let (mut node_loop, _handles) = strain_loop();
        assert!(!node_loop.is_ready());
        node_loop.boot();
        assert!(node_loop.is_ready());

        let output = node_loop.link_mut().take_output();
        assert_eq!(output.len(), 9);
        assert!(output[..8].iter().all(|l| l.ends_with("initialized")));
        assert_eq!(output[8], "STRAIN_ARDUINO_READY");
    }

    #[test]
    fn tare_then_zero_record() {
        let (mut node_loop, handles) = strain_loop();
        for handle in &handles {
            handle.set_raw(52_000);
        }
        node_loop.boot();
        node_loop.link_mut().take_output();

        node_loop.link_mut().push_input("TARE\n");
        node_loop.poll(50);
        assert_eq!(node_loop.link_mut().take_output(), ["TARE_COMPLETE"]);

        node_loop.poll(100);
        assert_eq!(
            node_loop.link_mut().take_output(),
            ["STRAIN,100,0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,0.000000"]
        );
        assert_eq!(node_loop.stats().records_emitted, 1);
        assert_eq!(node_loop.stats().commands_applied, 1);
    }

    #[test]
    fn one_command_line_per_poll() {
        let (mut node_loop, _handles) = strain_loop();
        node_loop.boot();
        node_loop.link_mut().take_output();

        node_loop.link_mut().push_input("IDENTITY\nIDENTITY\n");
        node_loop.poll(1);
        assert_eq!(node_loop.link_mut().take_output(), ["STRAIN_ARDUINO_READY"]);
        node_loop.poll(2);
        assert_eq!(node_loop.link_mut().take_output(), ["STRAIN_ARDUINO_READY"]);
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let (mut node_loop, _handles) = strain_loop();
        node_loop.boot();
        node_loop.link_mut().take_output();

        node_loop.link_mut().push_input("IDEN");
        node_loop.poll(1);
        assert!(node_loop.link_mut().take_output().is_empty());

        node_loop.link_mut().push_input("TITY\n");
        node_loop.poll(2);
        assert_eq!(node_loop.link_mut().take_output(), ["STRAIN_ARDUINO_READY"]);
    }

    #[test]
    fn oversized_line_is_dropped_and_loop_recovers() {
        let (mut node_loop, _handles) = strain_loop();
        node_loop.boot();
        node_loop.link_mut().take_output();

        let long = format!("CALIBRATE,1,{}\n", "9".repeat(200));
        node_loop.link_mut().push_input(&long);
        node_loop.link_mut().push_input("IDENTITY\n");

        node_loop.poll(1);
        assert!(node_loop.link_mut().take_output().is_empty());
        assert_eq!(node_loop.stats().line_overflows, 1);

        node_loop.poll(2);
        assert_eq!(node_loop.link_mut().take_output(), ["STRAIN_ARDUINO_READY"]);
        assert_eq!(node_loop.node().channels()[0].scale(), 1.0);
    }

    #[test]
    fn write_failures_are_counted_not_fatal() {
        let (mut node_loop, _handles) = strain_loop();
        node_loop.boot();
        node_loop.link_mut().take_output();
        node_loop.link_mut().fail_writes(true);

        node_loop.poll(100);
        node_loop.poll(200);
        assert_eq!(node_loop.stats().link_write_failures, 2);
        assert_eq!(node_loop.stats().records_emitted, 2);

        node_loop.link_mut().fail_writes(false);
        node_loop.poll(300);
        assert_eq!(node_loop.link_mut().take_output().len(), 1);
    }

    #[test]
    fn motion_calibration_suspends_then_resumes_sampling() {
        let (first, _h1) = MockMotionSensor::new();
        let (second, _h2) = MockMotionSensor::new();
        let config = MotionConfig::default().with_calibration_iterations(5);
        let node = MotionNode::new([first, second], NoDelay, config);
        let mut node_loop = NodeLoop::new(node, MemoryLink::new());

        node_loop.boot();
        assert_eq!(
            node_loop.link_mut().take_output(),
            ["Sensor 1 initialized", "Sensor 2 initialized", "MOTION_ARDUINO_READY"]
        );

        node_loop.link_mut().push_input("CALIBRATE\n");
        node_loop.poll(5);
        assert_eq!(
            node_loop.link_mut().take_output(),
            ["CALIBRATING_SENSORS,START", "CALIBRATING_SENSORS,COMPLETE"]
        );

        node_loop.poll(4000);
        let output = node_loop.link_mut().take_output();
        assert_eq!(output.len(), 1);
        assert!(output[0].starts_with("MOTION,4000,"));
    }
}
