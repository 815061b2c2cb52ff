//! Outbound frames
//!
//! [`Frame`]'s `Display` impl is the exact wire grammar. Encoding into a
//! fixed-capacity buffer cannot fail for any value a node produces:
//! [`FRAME_CAPACITY`] covers the widest possible `f32` formatting.
//!
//! [`Frame::decode`] is the host-side inverse.

use core::{fmt, fmt::Write, str::FromStr};

use heapless::{String, Vec};

use crate::{
    constants::{
        channels::{MOTION_RECORD_MODULES, STRAIN_CHANNEL_COUNT},
        protocol::{ANGLE_DECIMALS, FRAME_CAPACITY, MOTION_BANNER, STRAIN_BANNER, STRAIN_DECIMALS},
    },
    errors::DecodeError,
    fusion::Orientation,
    node::NodeKind,
    record::{MotionRecord, Record, StrainRecord},
};

/// Longest `ERROR,<reason>` reason kept when decoding
pub const MAX_REASON_LEN: usize = 32;

/// Encoded frame text, without the trailing newline
pub type FrameText = String<FRAME_CAPACITY>;

/// Progress marker of the bias calibration routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    /// Calibration started; sampling is suspended
    Start,
    /// Calibration finished; sampling resumes
    Complete,
}

/// One outbound line
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Ready banner, sent at boot and in reply to `IDENTITY`
    Banner(NodeKind),
    /// Boot-time probe result of one physical channel
    ChannelInit {
        /// Node kind, selects `Channel` or `Sensor` wording
        kind: NodeKind,
        /// 1-based channel number
        channel: u8,
        /// Whether the probe succeeded
        found: bool,
    },
    /// Snapshot taken at a scheduler tick
    Record(Record),
    /// Every strain channel was tared
    TareComplete,
    /// One strain channel took a new scale factor
    CalibrationSet {
        /// 1-based channel number
        channel: u8,
        /// Factor now in effect
        factor: f32,
    },
    /// Bias calibration progress
    Calibrating(CalibrationPhase),
    /// Rejected command (strict mode only)
    Error {
        /// Machine-readable reason
        reason: String<MAX_REASON_LEN>,
    },
}

impl Frame {
    /// Rejection frame for `reason`, truncated to [`MAX_REASON_LEN`]
    pub fn error(reason: &str) -> Self {
        let mut text = String::new();
        for ch in reason.chars() {
            if text.push(ch).is_err() {
                break;
            }
        }
        Self::Error { reason: text }
    }

    /// Encode into a fixed-capacity line
    pub fn encode(&self) -> FrameText {
        let mut text = FrameText::new();
        // Capacity covers the widest frame, so the write cannot overflow
        let _ = write!(text, "{}", self);
        text
    }

    /// Decode one line received from a node
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DecodeError::Empty);
        }

        match line {
            STRAIN_BANNER => return Ok(Self::Banner(NodeKind::Strain)),
            MOTION_BANNER => return Ok(Self::Banner(NodeKind::Motion)),
            "TARE_COMPLETE" => return Ok(Self::TareComplete),
            "CALIBRATING_SENSORS,START" => return Ok(Self::Calibrating(CalibrationPhase::Start)),
            "CALIBRATING_SENSORS,COMPLETE" => {
                return Ok(Self::Calibrating(CalibrationPhase::Complete))
            }
            _ => {}
        }

        if line.starts_with("STRAIN,") {
            return decode_strain(line);
        }
        if line.starts_with("MOTION,") {
            return decode_motion(line);
        }
        if let Some(args) = line.strip_prefix("CALIBRATION_SET,") {
            let (channel, factor) = args
                .split_once(',')
                .ok_or(DecodeError::FieldCount { expected: 3, found: 2 })?;
            return Ok(Self::CalibrationSet {
                channel: parse_field(channel, 1)?,
                factor: parse_field(factor, 2)?,
            });
        }
        if let Some(rest) = line.strip_prefix("ERROR: ") {
            let rest = rest.strip_suffix(" not found!").ok_or(DecodeError::UnknownFrame)?;
            return decode_channel_init(rest, false);
        }
        if let Some(reason) = line.strip_prefix("ERROR,") {
            return Ok(Self::error(reason));
        }
        if let Some(rest) = line.strip_suffix(" initialized") {
            return decode_channel_init(rest, true);
        }

        Err(DecodeError::UnknownFrame)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banner(kind) => f.write_str(kind.banner()),
            Self::ChannelInit { kind, channel, found: true } => {
                write!(f, "{} {} initialized", kind.channel_label(), channel)
            }
            Self::ChannelInit { kind, channel, found: false } => {
                write!(f, "ERROR: {} {} not found!", kind.channel_label(), channel)
            }
            Self::Record(Record::Strain(record)) => {
                write!(f, "STRAIN,{}", record.timestamp)?;
                for value in &record.values {
                    write!(f, ",{:.*}", STRAIN_DECIMALS, value)?;
                }
                Ok(())
            }
            Self::Record(Record::Motion(record)) => {
                write!(f, "MOTION,{}", record.timestamp)?;
                for module in &record.modules {
                    write!(
                        f,
                        ",{:.*},{:.*},{:.*}",
                        ANGLE_DECIMALS, module.pitch,
                        ANGLE_DECIMALS, module.roll,
                        ANGLE_DECIMALS, module.yaw,
                    )?;
                }
                Ok(())
            }
            Self::TareComplete => f.write_str("TARE_COMPLETE"),
            Self::CalibrationSet { channel, factor } => {
                write!(f, "CALIBRATION_SET,{},{:.*}", channel, STRAIN_DECIMALS, factor)
            }
            Self::Calibrating(CalibrationPhase::Start) => f.write_str("CALIBRATING_SENSORS,START"),
            Self::Calibrating(CalibrationPhase::Complete) => {
                f.write_str("CALIBRATING_SENSORS,COMPLETE")
            }
            Self::Error { reason } => write!(f, "ERROR,{}", reason),
        }
    }
}

impl From<Record> for Frame {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

fn parse_field<T: FromStr>(text: &str, index: usize) -> Result<T, DecodeError> {
    text.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidNumber { index })
}

fn decode_strain(line: &str) -> Result<Frame, DecodeError> {
    const EXPECTED: usize = STRAIN_CHANNEL_COUNT + 2;

    let found = line.split(',').count();
    if found != EXPECTED {
        return Err(DecodeError::FieldCount { expected: EXPECTED, found });
    }

    let mut fields = line.split(',').skip(1);
    let timestamp = parse_field(fields.next().unwrap_or_default(), 1)?;

    let mut values = Vec::new();
    for (offset, field) in fields.enumerate() {
        let value: f32 = parse_field(field, offset + 2)?;
        // Count was checked above, the push always fits
        let _ = values.push(value);
    }

    Ok(Frame::Record(Record::Strain(StrainRecord { timestamp, values })))
}

fn decode_motion(line: &str) -> Result<Frame, DecodeError> {
    const EXPECTED: usize = MOTION_RECORD_MODULES * 3 + 2;

    let found = line.split(',').count();
    if found != EXPECTED {
        return Err(DecodeError::FieldCount { expected: EXPECTED, found });
    }

    let mut fields = line.split(',').skip(1);
    let timestamp = parse_field(fields.next().unwrap_or_default(), 1)?;

    let mut angles = [0.0f32; MOTION_RECORD_MODULES * 3];
    for (offset, (slot, field)) in angles.iter_mut().zip(fields).enumerate() {
        *slot = parse_field(field, offset + 2)?;
    }

    let mut modules = [Orientation::default(); MOTION_RECORD_MODULES];
    for (module, triple) in modules.iter_mut().zip(angles.chunks_exact(3)) {
        *module = Orientation::new(triple[0], triple[1], triple[2]);
    }

    Ok(Frame::Record(Record::Motion(MotionRecord { timestamp, modules })))
}

/// Parses `Channel <n>` / `Sensor <n>`
fn decode_channel_init(text: &str, found: bool) -> Result<Frame, DecodeError> {
    let (label, number) = text.split_once(' ').ok_or(DecodeError::UnknownFrame)?;
    let kind = match label {
        "Channel" => NodeKind::Strain,
        "Sensor" => NodeKind::Motion,
        _ => return Err(DecodeError::UnknownFrame),
    };

    Ok(Frame::ChannelInit {
        kind,
        channel: parse_field(number, 1)?,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strain_record(values: &[f32]) -> Record {
        Record::Strain(StrainRecord {
            timestamp: 1200,
            values: Vec::from_slice(values).unwrap(),
        })
    }

    #[test]
    fn encodes_strain_record_at_six_decimals() {
        let frame = Frame::Record(strain_record(&[0.0, 1.5, -2.25, 0.0, 0.0, 0.0, 0.0, 1234.5678]));
        assert_eq!(
            frame.encode().as_str(),
            "STRAIN,1200,0.000000,1.500000,-2.250000,0.000000,0.000000,0.000000,0.000000,1234.567749"
        );
    }

    #[test]
    fn encodes_motion_record_at_two_decimals() {
        let record = MotionRecord {
            timestamp: 50,
            modules: [
                Orientation::new(1.0, 2.0, 3.0),
                Orientation::new(-0.5, 0.25, 10.0),
                Orientation::new(0.5, 0.25, 10.0),
            ],
        };
        assert_eq!(
            Frame::Record(Record::Motion(record)).encode().as_str(),
            "MOTION,50,1.00,2.00,3.00,-0.50,0.25,10.00,0.50,0.25,10.00"
        );
    }

    #[test]
    fn encodes_control_frames() {
        assert_eq!(Frame::Banner(NodeKind::Strain).encode().as_str(), "STRAIN_ARDUINO_READY");
        assert_eq!(Frame::Banner(NodeKind::Motion).encode().as_str(), "MOTION_ARDUINO_READY");
        assert_eq!(Frame::TareComplete.encode().as_str(), "TARE_COMPLETE");
        assert_eq!(
            Frame::CalibrationSet { channel: 3, factor: 2.5 }.encode().as_str(),
            "CALIBRATION_SET,3,2.500000"
        );
        assert_eq!(
            Frame::Calibrating(CalibrationPhase::Start).encode().as_str(),
            "CALIBRATING_SENSORS,START"
        );
        assert_eq!(
            Frame::ChannelInit { kind: NodeKind::Strain, channel: 4, found: false }.encode().as_str(),
            "ERROR: Channel 4 not found!"
        );
        assert_eq!(
            Frame::ChannelInit { kind: NodeKind::Motion, channel: 2, found: true }.encode().as_str(),
            "Sensor 2 initialized"
        );
        assert_eq!(Frame::error("UNSUPPORTED").encode().as_str(), "ERROR,UNSUPPORTED");
    }

    #[test]
    fn widest_strain_record_fits() {
        let frame = Frame::Record(strain_record(&[-f32::MAX; STRAIN_CHANNEL_COUNT]));
        let mut expected = std::string::String::from("STRAIN,1200");
        for _ in 0..STRAIN_CHANNEL_COUNT {
            expected.push_str(&format!(",{:.6}", -f32::MAX));
        }
        assert_eq!(frame.encode().as_str(), expected);
    }

    #[test]
    fn decodes_what_nodes_send() {
        let lines = [
            "STRAIN_ARDUINO_READY",
            "MOTION_ARDUINO_READY",
            "Channel 1 initialized",
            "ERROR: Sensor 2 not found!",
            "TARE_COMPLETE",
            "CALIBRATION_SET,3,2.500000",
            "CALIBRATING_SENSORS,COMPLETE",
            "STRAIN,10,1.000000,2.000000,3.000000,4.000000,5.000000,6.000000,7.000000,8.000000",
            "MOTION,10,1.00,2.00,3.00,4.00,5.00,6.00,7.00,8.00,9.00",
            "ERROR,MALFORMED",
        ];

        for line in lines {
            let frame = Frame::decode(line).unwrap();
            assert_eq!(frame.encode().as_str(), line);
        }
    }

    #[test]
    fn decode_checks_field_counts() {
        assert_eq!(
            Frame::decode("STRAIN,10,1.0,2.0"),
            Err(DecodeError::FieldCount { expected: 10, found: 4 })
        );
        assert_eq!(
            Frame::decode("MOTION,10,1,2,3,4,5,6,7,8,9,10"),
            Err(DecodeError::FieldCount { expected: 11, found: 12 })
        );
        assert_eq!(
            Frame::decode("STRAIN,10,1,2,3,x,5,6,7,8"),
            Err(DecodeError::InvalidNumber { index: 5 })
        );
        assert_eq!(
            Frame::decode("STRAIN,-5,1,2,3,4,5,6,7,8"),
            Err(DecodeError::InvalidNumber { index: 1 })
        );
    }

    #[test]
    fn decode_rejects_noise() {
        assert_eq!(Frame::decode("   "), Err(DecodeError::Empty));
        assert_eq!(Frame::decode("hello"), Err(DecodeError::UnknownFrame));
        assert_eq!(Frame::decode("Widget 1 initialized"), Err(DecodeError::UnknownFrame));
        assert_eq!(Frame::decode("ERROR: something broke"), Err(DecodeError::UnknownFrame));
    }

    #[test]
    fn error_reason_truncated() {
        let long = "X".repeat(100);
        match Frame::error(&long) {
            Frame::Error { reason } => assert_eq!(reason.len(), MAX_REASON_LEN),
            other => panic!("Expected error frame, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn decode_never_panics(line in ".{0,160}") {
            let _ = Frame::decode(&line);
        }

        #[test]
        fn decode_never_panics_on_record_prefixes(
            prefix in prop::sample::select(vec!["STRAIN,", "MOTION,", "CALIBRATION_SET,", "ERROR: ", "ERROR,"]),
            rest in "[0-9,.\\-a-zA-Z !]{0,120}",
        ) {
            let _ = Frame::decode(&format!("{}{}", prefix, rest));
        }
    }
}
