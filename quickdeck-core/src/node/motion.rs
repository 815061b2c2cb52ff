//! Motion node: two fused inertial modules plus one synthesized module
//!
//! Each tick reads both modules, runs one complementary filter cycle per
//! module and derives the third orientation from module 2:
//!
//! ```text
//! module 1 ──read──→ filter 1 ──→ orientation 1
//! module 2 ──read──→ filter 2 ──→ orientation 2 ──→ synthesized ──→ orientation 3
//! ```
//!
//! A module whose read fails keeps its previous orientation for that
//! tick. The argument-less `CALIBRATE` blocks the loop while every module
//! averages its at-rest bias.

use super::NodeKind;
use crate::{
    channel::{FullScale, InertialModule},
    constants::{
        channels::{IMU_ADDRESS_PRIMARY, IMU_ADDRESS_SECONDARY, MOTION_MODULE_COUNT},
        fusion::{CALIBRATION_ITERATIONS, SYNTH_OFFSET_CEILING_DEG, SYNTH_OFFSET_STEP_DEG},
        sampling::MOTION_SAMPLE_INTERVAL_MS,
    },
    errors::{CommandError, NodeError},
    fusion::{ComplementaryFilter, FusionConfig, Orientation, SynthesizedChannel},
    protocol::{CalibrationPhase, Command, Frame},
    record::{MotionRecord, Record},
    scheduler::Tick,
    time::Timestamp,
    traits::{CommandHandler, Delay, FrameSink, MotionSensor, Node},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motion node settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionConfig {
    /// Full-scale ranges programmed into every module
    pub ranges: FullScale,
    /// Bus address per module
    pub addresses: [u8; MOTION_MODULE_COUNT],
    /// Complementary filter parameters
    pub fusion: FusionConfig,
    /// Synthesized pitch offset increment per tick (degrees)
    pub synth_step_deg: f32,
    /// Synthesized pitch offset ceiling (degrees)
    pub synth_ceiling_deg: f32,
    /// Reads averaged by a bias calibration
    pub calibration_iterations: u16,
    /// Milliseconds between records
    pub sample_interval_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            ranges: FullScale::default(),
            addresses: [IMU_ADDRESS_PRIMARY, IMU_ADDRESS_SECONDARY],
            fusion: FusionConfig::default(),
            synth_step_deg: SYNTH_OFFSET_STEP_DEG,
            synth_ceiling_deg: SYNTH_OFFSET_CEILING_DEG,
            calibration_iterations: CALIBRATION_ITERATIONS,
            sample_interval_ms: MOTION_SAMPLE_INTERVAL_MS,
        }
    }
}

impl MotionConfig {
    /// Module ranges; the filter's gyro sensitivity follows
    pub fn with_ranges(mut self, ranges: FullScale) -> Self {
        self.ranges = ranges;
        self.fusion = self.fusion.with_gyro_range(ranges.gyro);
        self
    }

    /// Filter parameters
    ///
    /// The gyro divisor always follows the configured ranges, whichever
    /// builder runs last.
    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion.with_gyro_range(self.ranges.gyro);
        self
    }

    /// Synthesized offset sawtooth
    pub fn with_synth_offset(mut self, step_deg: f32, ceiling_deg: f32) -> Self {
        self.synth_step_deg = step_deg;
        self.synth_ceiling_deg = ceiling_deg;
        self
    }

    /// Reads averaged per bias calibration
    pub fn with_calibration_iterations(mut self, iterations: u16) -> Self {
        self.calibration_iterations = iterations;
        self
    }

    /// Record interval
    pub fn with_sample_interval(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }
}

/// Inertial acquisition node
#[derive(Debug)]
pub struct MotionNode<S, D> {
    modules: [InertialModule<S>; MOTION_MODULE_COUNT],
    filters: [ComplementaryFilter; MOTION_MODULE_COUNT],
    synthesized: SynthesizedChannel,
    delay: D,
    config: MotionConfig,
    /// Failed bus transactions since boot
    bus_failures: u32,
}

impl<S: MotionSensor, D: Delay> MotionNode<S, D> {
    /// Node over one sensor per module, in module order
    ///
    /// `delay` paces the blocking bias calibration.
    pub fn new(sensors: [S; MOTION_MODULE_COUNT], delay: D, config: MotionConfig) -> Self {
        let mut index = 0;
        let modules = sensors.map(|sensor| {
            let module = InertialModule::new(
                index as u8 + 1,
                sensor,
                config.addresses[index],
                config.ranges,
            );
            index += 1;
            module
        });

        Self {
            modules,
            filters: core::array::from_fn(|_| ComplementaryFilter::new(config.fusion)),
            synthesized: SynthesizedChannel::new(config.synth_step_deg, config.synth_ceiling_deg),
            delay,
            config,
            bus_failures: 0,
        }
    }

    /// Physical modules, module 1 first
    pub fn modules(&self) -> &[InertialModule<S>] {
        &self.modules
    }

    /// Latest estimate of every module, synthesized module last
    pub fn estimates(&self) -> [Orientation; MOTION_MODULE_COUNT + 1] {
        let second = self.filters[1].estimate();
        [
            self.filters[0].estimate(),
            second,
            self.synthesized.derive(second),
        ]
    }

    /// Settings in effect
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Run one fusion cycle of width `dt_s` and snapshot the result
    pub fn fuse_all(&mut self, timestamp: Timestamp, dt_s: f32) -> MotionRecord {
        let mut fused = [Orientation::default(); MOTION_MODULE_COUNT];

        for ((module, filter), out) in self
            .modules
            .iter_mut()
            .zip(self.filters.iter_mut())
            .zip(fused.iter_mut())
        {
            *out = match module.read() {
                Ok(sample) => filter.update(Some(&sample), dt_s),
                Err(NodeError::BusTransaction { .. }) => {
                    self.bus_failures = self.bus_failures.wrapping_add(1);
                    filter.update(None, dt_s)
                }
                Err(_) => filter.update(None, dt_s),
            };
        }

        let synthesized = self.synthesized.next(fused[1]);
        MotionRecord {
            timestamp,
            modules: [fused[0], fused[1], synthesized],
        }
    }

    /// Average at-rest bias on every module, blocking until done
    pub fn calibrate_all<K: FrameSink>(&mut self, sink: &mut K) {
        sink.emit(&Frame::Calibrating(CalibrationPhase::Start));
        log_info!("Calibrating {} inertial modules", MOTION_MODULE_COUNT);

        for module in &mut self.modules {
            let _report = module.calibrate(self.config.calibration_iterations, &mut self.delay);
            log_debug!("Module {} bias {:?}", module.number(), _report.bias);
        }

        sink.emit(&Frame::Calibrating(CalibrationPhase::Complete));
    }
}

impl<S: MotionSensor, D: Delay> CommandHandler for MotionNode<S, D> {
    fn kind(&self) -> NodeKind {
        NodeKind::Motion
    }

    fn handle<K: FrameSink>(&mut self, command: Command, sink: &mut K) -> Result<(), CommandError> {
        match command {
            Command::CalibrateSensors => self.calibrate_all(sink),
            Command::Identity => sink.emit(&Frame::Banner(NodeKind::Motion)),
            Command::Tare | Command::Calibrate { .. } => {
                return Err(CommandError::Unsupported {
                    command: command.word(),
                })
            }
        }
        Ok(())
    }
}

impl<S: MotionSensor, D: Delay> Node for MotionNode<S, D> {
    fn boot<K: FrameSink>(&mut self, sink: &mut K) {
        for module in &mut self.modules {
            let found = module.begin().is_ok();
            sink.emit(&Frame::ChannelInit {
                kind: NodeKind::Motion,
                channel: module.number(),
                found,
            });
        }
    }

    fn sample(&mut self, tick: Tick) -> Record {
        Record::Motion(self.fuse_all(tick.now, tick.dt_s()))
    }

    fn sample_interval_ms(&self) -> u64 {
        self.config.sample_interval_ms
    }

    fn read_failures(&self) -> u32 {
        self.bus_failures
    }
}
