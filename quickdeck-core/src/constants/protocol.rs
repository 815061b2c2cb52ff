//! Wire Protocol Constants

/// Maximum inbound command line length (bytes, without newline).
///
/// The longest valid command is `CALIBRATE,<n>,<factor>`, well under
/// this. Longer lines are discarded whole.
pub const MAX_COMMAND_LEN: usize = 64;

/// Capacity of one encoded outbound frame (bytes).
///
/// Covers a strain record of eight `f32::MAX` values at six decimals.
pub const FRAME_CAPACITY: usize = 512;

/// Decimal digits for strain values and calibration factors.
pub const STRAIN_DECIMALS: usize = 6;

/// Decimal digits for orientation angles.
pub const ANGLE_DECIMALS: usize = 2;

/// Strain node ready banner.
pub const STRAIN_BANNER: &str = "STRAIN_ARDUINO_READY";

/// Motion node ready banner.
pub const MOTION_BANNER: &str = "MOTION_ARDUINO_READY";
