//! Node behavior seams
//!
//! [`NodeLoop`](crate::node::NodeLoop) drives any node kind through these
//! two traits: the scheduler calls [`Node::sample`], the dispatcher calls
//! [`CommandHandler::handle`]. Both run in the same sequential loop, so a
//! node owns its channel state exclusively and needs no locking.

use crate::{
    errors::CommandError,
    node::NodeKind,
    protocol::Command,
    record::Record,
    scheduler::Tick,
    traits::FrameSink,
};

/// Applies decoded commands to node state
pub trait CommandHandler {
    /// Kind of node handling the commands
    fn kind(&self) -> NodeKind;

    /// Apply one command, emitting acknowledgements into `sink`
    ///
    /// A rejected command must leave all state untouched and emit nothing;
    /// the dispatcher decides whether the host hears about it.
    fn handle<K: FrameSink>(&mut self, command: Command, sink: &mut K) -> Result<(), CommandError>;
}

/// One acquisition node
pub trait Node: CommandHandler {
    /// Probe every channel and emit one init line per channel
    fn boot<K: FrameSink>(&mut self, sink: &mut K);

    /// Read all channels for one tick
    ///
    /// Never fails: unavailable channels degrade to their documented
    /// fallback value.
    fn sample(&mut self, tick: Tick) -> Record;

    /// Milliseconds between records
    fn sample_interval_ms(&self) -> u64;

    /// Sensor reads that failed since boot
    fn read_failures(&self) -> u32 {
        0
    }
}
