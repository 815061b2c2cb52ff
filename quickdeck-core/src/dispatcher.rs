//! Command dispatcher
//!
//! Turns one complete inbound line into a state change on the node:
//!
//! ```text
//! Idle ──line──→ ProcessingCommand ──decode──→ handle ──→ Idle
//!                                    │           │
//!                                    └─ reject ──┴─→ drop (or ERROR,<reason>)
//! ```
//!
//! Nothing persists between lines. A rejected command never mutates node
//! state. Under the default [`RejectPolicy::Silent`] the host hears
//! nothing about it; [`RejectPolicy::Report`] answers with
//! `ERROR,<reason>` instead.

use crate::{
    errors::CommandError,
    protocol::{Command, Frame},
    traits::{CommandHandler, FrameSink},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    /// Waiting for a line
    #[default]
    Idle,
    /// Applying a command
    ProcessingCommand,
}

/// What the host hears about a rejected command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectPolicy {
    /// Drop without a frame
    #[default]
    Silent,
    /// Emit `ERROR,<reason>`
    Report,
}

/// Dispatcher settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DispatchConfig {
    /// Handling of rejected commands
    pub reject_policy: RejectPolicy,
}

impl DispatchConfig {
    /// Select the reject policy
    pub fn with_reject_policy(mut self, policy: RejectPolicy) -> Self {
        self.reject_policy = policy;
        self
    }
}

/// Per-node command dispatcher
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
    state: DispatchState,
    applied: u32,
    dropped: u32,
}

impl Dispatcher {
    /// Idle dispatcher
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            state: DispatchState::Idle,
            applied: 0,
            dropped: 0,
        }
    }

    /// Decode `line` and apply it to `handler`
    ///
    /// Returns the applied command, `Ok(None)` for an empty line, or the
    /// reason the line was rejected.
    pub fn dispatch<H, K>(
        &mut self,
        line: &str,
        handler: &mut H,
        sink: &mut K,
    ) -> Result<Option<Command>, CommandError>
    where
        H: CommandHandler,
        K: FrameSink,
    {
        self.state = DispatchState::ProcessingCommand;

        let result = match Command::decode(line) {
            Ok(Some(command)) => handler.handle(command, sink).map(|()| Some(command)),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match &result {
            Ok(Some(_command)) => {
                self.applied = self.applied.wrapping_add(1);
                log_debug!("Applied {}", _command);
            }
            Ok(None) => {}
            Err(e) => {
                self.dropped = self.dropped.wrapping_add(1);
                log_warn!("Dropped command {:?}: {}", line, e);
                if self.config.reject_policy == RejectPolicy::Report {
                    sink.emit(&Frame::error(e.reason()));
                }
            }
        }

        self.state = DispatchState::Idle;
        result
    }

    /// Current state
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Settings in effect
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Commands applied since creation
    pub fn applied(&self) -> u32 {
        self.applied
    }

    /// Commands rejected since creation
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mock::MockAmplifier,
        node::{NodeKind, StrainConfig, StrainNode},
    };

    fn strain_node() -> StrainNode<MockAmplifier> {
        let amplifiers = [(); 8].map(|_| {
            let (amp, handle) = MockAmplifier::new();
            handle.set_raw(1000);
            amp
        });
        let mut node = StrainNode::new(amplifiers, StrainConfig::default());
        let mut boot_frames: std::vec::Vec<Frame> = std::vec::Vec::new();
        crate::traits::Node::boot(&mut node, &mut boot_frames);
        node
    }

    fn scales(node: &StrainNode<MockAmplifier>) -> std::vec::Vec<f32> {
        node.channels().iter().map(|c| c.scale()).collect()
    }

    #[test]
    fn calibrate_applies_and_acknowledges() {
        let mut node = strain_node();
        let mut dispatcher = Dispatcher::default();
        let mut frames: std::vec::Vec<Frame> = std::vec::Vec::new();

        let result = dispatcher.dispatch("CALIBRATE,3,2.500000\n", &mut node, &mut frames);
        assert_eq!(result, Ok(Some(Command::Calibrate { channel: 3, factor: 2.5 })));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].encode().as_str(), "CALIBRATION_SET,3,2.500000");
        assert_eq!(node.channels()[2].scale(), 2.5);
        assert_eq!(dispatcher.state(), DispatchState::Idle);
        assert_eq!(dispatcher.applied(), 1);
    }

    #[test]
    fn out_of_range_channel_is_silently_dropped() {
        let mut node = strain_node();
        let before = scales(&node);
        let mut dispatcher = Dispatcher::default();
        let mut frames: std::vec::Vec<Frame> = std::vec::Vec::new();

        for line in ["CALIBRATE,9,1.0\n", "CALIBRATE,0,1.0\n"] {
            let result = dispatcher.dispatch(line, &mut node, &mut frames);
            assert!(matches!(result, Err(CommandError::ChannelOutOfRange { count: 8, .. })));
        }

        assert!(frames.is_empty());
        assert_eq!(scales(&node), before);
        assert_eq!(dispatcher.dropped(), 2);
    }

    #[test]
    fn malformed_and_unknown_lines_emit_nothing() {
        let mut node = strain_node();
        let mut dispatcher = Dispatcher::default();
        let mut frames: std::vec::Vec<Frame> = std::vec::Vec::new();

        for line in ["CALIBRATE,2", "CALIBRATE,x,1", "RESET", "CALIBRATE,2,-4"] {
            assert!(dispatcher.dispatch(line, &mut node, &mut frames).is_err());
        }
        assert!(frames.is_empty());
    }

    #[test]
    fn empty_line_is_not_a_command() {
        let mut node = strain_node();
        let mut dispatcher = Dispatcher::default();
        let mut frames: std::vec::Vec<Frame> = std::vec::Vec::new();

        assert_eq!(dispatcher.dispatch("\r\n", &mut node, &mut frames), Ok(None));
        assert!(frames.is_empty());
        assert_eq!(dispatcher.applied(), 0);
        assert_eq!(dispatcher.dropped(), 0);
    }

    #[test]
    fn identity_echoes_banner() {
        let mut node = strain_node();
        let mut dispatcher = Dispatcher::default();
        let mut frames: std::vec::Vec<Frame> = std::vec::Vec::new();

        dispatcher.dispatch("IDENTITY", &mut node, &mut frames).unwrap();
        assert_eq!(frames, vec![Frame::Banner(NodeKind::Strain)]);
    }

    #[test]
    fn report_policy_answers_rejections() {
        let mut node = strain_node();
        let before = scales(&node);
        let config = DispatchConfig::default().with_reject_policy(RejectPolicy::Report);
        let mut dispatcher = Dispatcher::new(config);
        let mut frames: std::vec::Vec<Frame> = std::vec::Vec::new();

        let _ = dispatcher.dispatch("CALIBRATE,9,1.0", &mut node, &mut frames);
        let _ = dispatcher.dispatch("CALIBRATE", &mut node, &mut frames);
        let _ = dispatcher.dispatch("HELLO", &mut node, &mut frames);

        let lines: std::vec::Vec<_> = frames.iter().map(|f| f.encode().as_str().to_owned()).collect();
        assert_eq!(
            lines,
            ["ERROR,CHANNEL_OUT_OF_RANGE", "ERROR,UNSUPPORTED", "ERROR,UNRECOGNIZED"]
        );
        assert_eq!(scales(&node), before);
    }
}
