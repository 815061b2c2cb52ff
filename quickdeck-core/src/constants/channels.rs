//! Channel Counts and Hardware Defaults

/// Strain channels on a strain node.
///
/// Fixed by the record format: `STRAIN,<t>,<v1>,...,<v8>`.
pub const STRAIN_CHANNEL_COUNT: usize = 8;

/// Physical inertial modules on a motion node.
pub const MOTION_MODULE_COUNT: usize = 2;

/// Orientation triples per motion record (two real, one synthesized).
pub const MOTION_RECORD_MODULES: usize = MOTION_MODULE_COUNT + 1;

/// Default amplifier gain setting (channel A, x128).
pub const DEFAULT_STRAIN_GAIN: u8 = 128;

/// Default scale factor: readings are raw counts.
pub const DEFAULT_SCALE_FACTOR: f32 = 1.0;

/// Bus address of the first inertial module (AD0 low).
pub const IMU_ADDRESS_PRIMARY: u8 = 0x68;

/// Bus address of the second inertial module (AD0 high).
pub const IMU_ADDRESS_SECONDARY: u8 = 0x69;

/// Default data/clock pin pairs for the eight strain channels.
///
/// Opaque identifiers; the board support layer maps them to pins.
pub const STRAIN_PIN_PAIRS: [(u8, u8); STRAIN_CHANNEL_COUNT] = [
    (2, 3),
    (4, 5),
    (6, 7),
    (8, 9),
    (10, 11),
    (12, 13),
    (A0_PIN, A0_PIN + 1),
    (A0_PIN + 2, A0_PIN + 3),
];

/// First analog pin identifier on the reference board.
const A0_PIN: u8 = 14;
