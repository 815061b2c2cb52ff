//! Strain node: eight bridge amplifier channels
//!
//! Commands:
//! - `TARE` zeroes every channel and answers `TARE_COMPLETE`
//! - `CALIBRATE,<n>,<factor>` sets one channel's scale and answers
//!   `CALIBRATION_SET,<n>,<factor>`
//! - `IDENTITY` repeats the ready banner
//!
//! The argument-less `CALIBRATE` belongs to the motion node and is
//! rejected here.

use heapless::Vec;

use super::NodeKind;
use crate::{
    channel::{Gain, PinPair, StrainChannel},
    constants::{
        channels::{DEFAULT_STRAIN_GAIN, STRAIN_CHANNEL_COUNT, STRAIN_PIN_PAIRS},
        sampling::STRAIN_SAMPLE_INTERVAL_MS,
    },
    errors::CommandError,
    protocol::{Command, Frame},
    record::{Record, StrainRecord},
    scheduler::Tick,
    time::Timestamp,
    traits::{CommandHandler, FrameSink, Node, StrainAmplifier},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strain node settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrainConfig {
    /// Gain per channel
    pub gains: [Gain; STRAIN_CHANNEL_COUNT],
    /// Data/clock pins per channel
    pub pins: [PinPair; STRAIN_CHANNEL_COUNT],
    /// Milliseconds between records
    pub sample_interval_ms: u64,
}

impl Default for StrainConfig {
    fn default() -> Self {
        Self {
            gains: [Gain::from_factor(DEFAULT_STRAIN_GAIN).unwrap_or_default(); STRAIN_CHANNEL_COUNT],
            pins: STRAIN_PIN_PAIRS.map(|(data, clock)| PinPair::new(data, clock)),
            sample_interval_ms: STRAIN_SAMPLE_INTERVAL_MS,
        }
    }
}

impl StrainConfig {
    /// Gain of one 1-based channel; out-of-range channels are ignored
    pub fn with_gain(mut self, channel: u8, gain: Gain) -> Self {
        if let Some(slot) = usize::from(channel)
            .checked_sub(1)
            .and_then(|i| self.gains.get_mut(i))
        {
            *slot = gain;
        }
        self
    }

    /// Pins of one 1-based channel; out-of-range channels are ignored
    pub fn with_pins(mut self, channel: u8, pins: PinPair) -> Self {
        if let Some(slot) = usize::from(channel)
            .checked_sub(1)
            .and_then(|i| self.pins.get_mut(i))
        {
            *slot = pins;
        }
        self
    }

    /// Record interval
    pub fn with_sample_interval(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }
}

/// Strain gauge acquisition node
#[derive(Debug)]
pub struct StrainNode<A> {
    channels: [StrainChannel<A>; STRAIN_CHANNEL_COUNT],
    config: StrainConfig,
}

impl<A: StrainAmplifier> StrainNode<A> {
    /// Node over one amplifier per channel, in channel order
    pub fn new(amplifiers: [A; STRAIN_CHANNEL_COUNT], config: StrainConfig) -> Self {
        let mut index = 0;
        let channels = amplifiers.map(|amplifier| {
            let channel = StrainChannel::new(
                index as u8 + 1,
                amplifier,
                config.pins[index],
                config.gains[index],
            );
            index += 1;
            channel
        });

        Self { channels, config }
    }

    /// All channels, channel 1 first
    pub fn channels(&self) -> &[StrainChannel<A>] {
        &self.channels
    }

    /// One 1-based channel
    pub fn channel_mut(&mut self, channel: u8) -> Option<&mut StrainChannel<A>> {
        let index = usize::from(channel).checked_sub(1)?;
        self.channels.get_mut(index)
    }

    /// Settings in effect
    pub fn config(&self) -> &StrainConfig {
        &self.config
    }

    /// Zero every channel at the current load
    pub fn tare_all(&mut self) {
        for channel in &mut self.channels {
            channel.tare();
        }
        log_info!("All strain channels tared");
    }

    /// Read every channel into a record stamped `timestamp`
    pub fn read_all(&mut self, timestamp: Timestamp) -> StrainRecord {
        let mut values = Vec::new();
        for channel in &mut self.channels {
            // One slot per channel, the push always fits
            let _ = values.push(channel.read());
        }
        StrainRecord { timestamp, values }
    }
}

impl<A: StrainAmplifier> CommandHandler for StrainNode<A> {
    fn kind(&self) -> NodeKind {
        NodeKind::Strain
    }

    fn handle<K: FrameSink>(&mut self, command: Command, sink: &mut K) -> Result<(), CommandError> {
        match command {
            Command::Tare => {
                self.tare_all();
                sink.emit(&Frame::TareComplete);
            }
            Command::Calibrate { channel, factor } => {
                let count = STRAIN_CHANNEL_COUNT as u8;
                let target = self
                    .channel_mut(channel)
                    .ok_or(CommandError::ChannelOutOfRange { channel, count })?;

                target.set_scale(factor);
                let factor = target.scale();
                log_info!("Channel {} scale set to {}", channel, factor);
                sink.emit(&Frame::CalibrationSet { channel, factor });
            }
            Command::Identity => sink.emit(&Frame::Banner(NodeKind::Strain)),
            Command::CalibrateSensors => {
                return Err(CommandError::Unsupported {
                    command: command.word(),
                })
            }
        }
        Ok(())
    }
}

impl<A: StrainAmplifier> Node for StrainNode<A> {
    fn boot<K: FrameSink>(&mut self, sink: &mut K) {
        for channel in &mut self.channels {
            let found = channel.begin().is_ok();
            sink.emit(&Frame::ChannelInit {
                kind: NodeKind::Strain,
                channel: channel.number(),
                found,
            });
        }
    }

    fn sample(&mut self, tick: Tick) -> Record {
        Record::Strain(self.read_all(tick.now))
    }

    fn sample_interval_ms(&self) -> u64 {
        self.config.sample_interval_ms
    }
}
