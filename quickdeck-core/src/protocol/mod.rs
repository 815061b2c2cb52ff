//! Serial line protocol
//!
//! One ASCII line per record or command, newline-terminated, fields
//! separated by commas. Both directions share this module: nodes encode
//! frames and decode commands, the host does the reverse.
//!
//! ## Outbound (node → host)
//!
//! ```text
//! STRAIN_ARDUINO_READY | MOTION_ARDUINO_READY
//! Channel <n> initialized | ERROR: Channel <n> not found!
//! Sensor <n> initialized  | ERROR: Sensor <n> not found!
//! STRAIN,<t>,<v1>,...,<v8>                 values at 6 decimals
//! MOTION,<t>,<p1>,<r1>,<y1>,...,<y3>       angles at 2 decimals
//! TARE_COMPLETE
//! CALIBRATION_SET,<n>,<factor>             factor at 6 decimals
//! CALIBRATING_SENSORS,START | CALIBRATING_SENSORS,COMPLETE
//! ERROR,<reason>                           strict mode only
//! ```
//!
//! ## Inbound (host → node)
//!
//! ```text
//! TARE                       strain node
//! CALIBRATE,<n>,<factor>     strain node
//! CALIBRATE                  motion node
//! IDENTITY                   both
//! ```

pub mod command;
pub mod frame;
pub mod line;

pub use command::{Command, CommandText};
pub use frame::{CalibrationPhase, Frame};
pub use line::LineBuffer;
