//! Two-node acquisition
//!
//! Each link is read on its own Tokio blocking task. Records from both
//! nodes are tagged with their node kind and pushed into one bounded
//! channel; when the consumer falls behind, readers block and the node's
//! bytes wait in the transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{
    link::{NodeLink, NodeMessage},
    transport::Transport,
    LinkError, LinkStats, NodeKind, Record, Result,
};

/// Acquisition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Samples buffered between readers and consumer
    pub channel_capacity: usize,
    /// Reader sleep when a poll found nothing
    pub idle_sleep_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            idle_sleep_ms: 1,
        }
    }
}

impl AcquisitionConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        if config.channel_capacity == 0 {
            return Err(LinkError::Config("channel_capacity must be > 0".into()));
        }
        Ok(config)
    }
}

/// One record with the node that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Producing node
    pub kind: NodeKind,
    /// The record, stamped with that node's clock
    pub record: Record,
}

impl Sample {
    /// JSON form for downstream consumers
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Final counters of both readers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcquisitionStats {
    /// Strain link counters
    pub strain: LinkStats,
    /// Motion link counters
    pub motion: LinkStats,
}

/// Strain and motion links read in the background
///
/// Dropping it without calling [`Acquisition::stop`] also ends both
/// readers, within one idle sleep or transport read timeout.
pub struct Acquisition {
    samples: mpsc::Receiver<Sample>,
    stop: watch::Sender<bool>,
    strain: JoinHandle<Result<LinkStats>>,
    motion: JoinHandle<Result<LinkStats>>,
}

impl Acquisition {
    /// Start both readers
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<S, M>(strain: NodeLink<S>, motion: NodeLink<M>, config: AcquisitionConfig) -> Self
    where
        S: Transport + 'static,
        M: Transport + 'static,
    {
        let (sender, samples) = mpsc::channel(config.channel_capacity.max(1));
        let (stop, stopped) = watch::channel(false);
        let idle = Duration::from_millis(config.idle_sleep_ms);

        log::info!("Acquisition started");
        Self {
            samples,
            strain: spawn_reader(strain, sender.clone(), stopped.clone(), idle),
            motion: spawn_reader(motion, sender, stopped, idle),
            stop,
        }
    }

    /// Next sample from either node
    ///
    /// `None` once both readers have ended.
    pub async fn next_sample(&mut self) -> Option<Sample> {
        self.samples.recv().await
    }

    /// Stop both readers and collect their counters
    ///
    /// Returns the first reader error, if a reader ended on one.
    pub async fn stop(mut self) -> Result<AcquisitionStats> {
        let _ = self.stop.send(true);
        self.samples.close();

        let strain = self.strain.await?;
        let motion = self.motion.await?;
        log::info!("Acquisition stopped");

        Ok(AcquisitionStats {
            strain: strain?,
            motion: motion?,
        })
    }
}

fn spawn_reader<T: Transport + 'static>(
    mut link: NodeLink<T>,
    samples: mpsc::Sender<Sample>,
    stop: watch::Receiver<bool>,
    idle: Duration,
) -> JoinHandle<Result<LinkStats>> {
    tokio::task::spawn_blocking(move || {
        let kind = link.kind();
        while !stop_requested(&stop, &samples) {
            match link.poll() {
                Ok(Some(NodeMessage::Sample(record))) => {
                    if samples.blocking_send(Sample { kind, record }).is_err() {
                        break;
                    }
                }
                Ok(Some(message)) => log::debug!("{:?} node: {:?}", kind, message),
                Ok(None) => std::thread::sleep(idle),
                Err(e) => {
                    log::warn!("{:?} reader stopped: {}", kind, e);
                    return Err(e);
                }
            }
        }
        Ok(link.stats())
    })
}

/// Stop on request, or once the `Acquisition` is gone
fn stop_requested(stop: &watch::Receiver<bool>, samples: &mpsc::Sender<Sample>) -> bool {
    *stop.borrow() || stop.has_changed().is_err() || samples.is_closed()
}
