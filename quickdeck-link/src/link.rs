//! Line protocol over one transport

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use quickdeck_core::{
    constants::BAUD_RATE,
    protocol::{CalibrationPhase, Frame},
    CommandError,
};
use serde::{Deserialize, Serialize};

use crate::{transport::Transport, Command, LinkError, LinkStats, NodeKind, Record, Result};

/// Link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial baud rate
    pub baud_rate: u32,
    /// How long `connect` waits for the ready banner
    pub handshake_timeout_ms: u64,
    /// Bytes requested per transport read
    pub read_chunk: usize,
    /// Longest line kept; longer lines are skipped whole
    pub max_line_len: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            handshake_timeout_ms: 2000,
            read_chunk: 256,
            max_line_len: 512,
        }
    }
}

impl LinkConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Handshake budget
    pub fn with_handshake_timeout(mut self, timeout_ms: u64) -> Self {
        self.handshake_timeout_ms = timeout_ms;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.read_chunk == 0 {
            return Err(LinkError::Config("read_chunk must be > 0".into()));
        }
        if self.max_line_len == 0 {
            return Err(LinkError::Config("max_line_len must be > 0".into()));
        }
        Ok(())
    }
}

/// Command acknowledgement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ack {
    /// All strain channels were tared
    TareComplete,
    /// A strain channel took a new factor
    CalibrationSet {
        /// 1-based channel
        channel: u8,
        /// Factor the node stored
        factor: f32,
    },
    /// Motion calibration began; records pause
    CalibrationStarted,
    /// Motion calibration finished; records resume
    CalibrationComplete,
}

/// One decoded line from a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeMessage {
    /// Record taken at a node tick
    Sample(Record),
    /// Reply to a command
    Ack(Ack),
    /// Ready banner
    Banner(NodeKind),
    /// Boot-time channel probe result
    ChannelStatus {
        /// 1-based channel or module
        channel: u8,
        /// Whether it answered
        found: bool,
    },
    /// Rejection reported by a strict-mode node
    Error(String),
}

impl From<Frame> for NodeMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Banner(kind) => Self::Banner(kind),
            Frame::ChannelInit { channel, found, .. } => Self::ChannelStatus { channel, found },
            Frame::Record(record) => Self::Sample(record),
            Frame::TareComplete => Self::Ack(Ack::TareComplete),
            Frame::CalibrationSet { channel, factor } => {
                Self::Ack(Ack::CalibrationSet { channel, factor })
            }
            Frame::Calibrating(CalibrationPhase::Start) => Self::Ack(Ack::CalibrationStarted),
            Frame::Calibrating(CalibrationPhase::Complete) => Self::Ack(Ack::CalibrationComplete),
            Frame::Error { reason } => Self::Error(reason.as_str().to_owned()),
        }
    }
}

/// Connected link to one node
pub struct NodeLink<T> {
    transport: T,
    kind: NodeKind,
    config: LinkConfig,
    buffer: Vec<u8>,
    partial: Vec<u8>,
    discarding: bool,
    lines: VecDeque<String>,
    stats: LinkStats,
}

impl<T: Transport> NodeLink<T> {
    /// Identify the node on `transport`
    ///
    /// Sends `IDENTITY` and reads until a ready banner arrives. Boot lines
    /// and records seen before the banner are discarded.
    pub fn connect(transport: T, expected: NodeKind, config: LinkConfig) -> Result<Self> {
        config.validate()?;
        let mut link = Self {
            transport,
            kind: expected,
            buffer: vec![0; config.read_chunk],
            partial: Vec::with_capacity(config.max_line_len),
            discarding: false,
            lines: VecDeque::new(),
            stats: LinkStats::default(),
            config,
        };

        link.write_command(Command::Identity)?;

        let timeout_ms = link.config.handshake_timeout_ms;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match link.next_frame()? {
                Some(Frame::Banner(found)) if found == expected => {
                    log::info!("Connected to {:?} node", expected);
                    return Ok(link);
                }
                Some(Frame::Banner(found)) => {
                    log::warn!("Expected {:?} node, {:?} node answered", expected, found);
                    return Err(LinkError::WrongNode { expected, found });
                }
                Some(_) => {}
                None if Instant::now() >= deadline => {
                    return Err(LinkError::HandshakeTimeout {
                        expected,
                        timeout_ms,
                    });
                }
                None => std::thread::yield_now(),
            }
        }
    }

    /// Next decoded message, or `None` if no complete line is waiting
    pub fn poll(&mut self) -> Result<Option<NodeMessage>> {
        while let Some(frame) = self.next_frame()? {
            if let Frame::Record(record) = &frame {
                if record_kind(record) != self.kind {
                    log::warn!("{:?} record on the {:?} link skipped", record_kind(record), self.kind);
                    self.stats.undecodable_lines += 1;
                    continue;
                }
                self.stats.samples_decoded += 1;
            }
            return Ok(Some(frame.into()));
        }
        Ok(None)
    }

    /// Send a command the node will act on
    ///
    /// Commands the node would silently drop are refused here instead.
    pub fn send(&mut self, command: Command) -> Result<()> {
        match self.kind.validate(&command) {
            Ok(()) => self.write_command(command),
            Err(CommandError::Unsupported { command }) => Err(LinkError::Unsupported {
                command,
                kind: self.kind,
            }),
            Err(e) => Err(LinkError::Rejected(e)),
        }
    }

    /// Node kind confirmed by the handshake
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Settings in effect
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Counters since connect
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Give back the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn write_command(&mut self, command: Command) -> Result<()> {
        let mut line = command.encode().as_str().to_owned();
        line.push('\n');
        self.transport.write_all(line.as_bytes())?;
        self.transport.flush()?;
        self.stats.commands_sent += 1;
        log::debug!("Sent {} to {:?} node", command, self.kind);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        while let Some(line) = self.next_line()? {
            self.stats.lines_read += 1;
            if line.trim().is_empty() {
                continue;
            }
            match Frame::decode(&line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.stats.undecodable_lines += 1;
                    log::debug!("Skipped line {:?}: {}", line, e);
                }
            }
        }
        Ok(None)
    }

    /// A queued line, reading once from the transport if none is queued
    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }

        let count = self.transport.read(&mut self.buffer)?;
        for &byte in &self.buffer[..count] {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                    self.stats.undecodable_lines += 1;
                } else {
                    if self.partial.last() == Some(&b'\r') {
                        self.partial.pop();
                    }
                    self.lines
                        .push_back(String::from_utf8_lossy(&self.partial).into_owned());
                }
                self.partial.clear();
            } else if self.discarding {
                continue;
            } else if self.partial.len() < self.config.max_line_len {
                self.partial.push(byte);
            } else {
                log::warn!("Line over {} bytes from {:?} node", self.config.max_line_len, self.kind);
                self.discarding = true;
                self.partial.clear();
            }
        }

        Ok(self.lines.pop_front())
    }
}

fn record_kind(record: &Record) -> NodeKind {
    match record {
        Record::Strain(_) => NodeKind::Strain,
        Record::Motion(_) => NodeKind::Motion,
    }
}
