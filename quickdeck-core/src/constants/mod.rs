//! Constants for QuickDeck nodes
//!
//! Every numeric value the nodes and the wire protocol depend on lives
//! here, with its unit in the name.
//!
//! ## Organization
//!
//! - **Sampling**: scheduler intervals and link parameters
//! - **Channels**: channel counts, gains, bus addresses
//! - **Fusion**: complementary filter and sensor sensitivities
//! - **Protocol**: line capacities and number formatting

/// Sampling intervals and link parameters.
pub mod sampling;

/// Channel counts and default hardware settings.
pub mod channels;

/// Complementary filter parameters and sensor sensitivities.
pub mod fusion;

/// Wire protocol capacities and formatting.
pub mod protocol;

pub use sampling::{BAUD_RATE, MOTION_SAMPLE_INTERVAL_MS, STRAIN_SAMPLE_INTERVAL_MS};
pub use channels::{MOTION_MODULE_COUNT, MOTION_RECORD_MODULES, STRAIN_CHANNEL_COUNT};
pub use fusion::{COMPLEMENTARY_ALPHA, SYNTH_OFFSET_CEILING_DEG, SYNTH_OFFSET_STEP_DEG};
pub use protocol::{FRAME_CAPACITY, MAX_COMMAND_LEN};
