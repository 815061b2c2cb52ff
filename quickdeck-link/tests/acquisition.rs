//! Two-node acquisition over simulated nodes

mod common;

use std::time::Duration;

use common::SimulatedNode;
use quickdeck_link::{
    Acquisition, AcquisitionConfig, LinkConfig, LinkError, MemoryTransport, NodeKind, NodeLink,
    Record,
};
use tokio::time::timeout;

#[tokio::test]
async fn samples_from_both_nodes_are_tagged() {
    let (strain, _strain_handles) = SimulatedNode::strain(500, 10);
    let (motion, _motion_handles) = SimulatedNode::motion(5);
    let strain = NodeLink::connect(strain, NodeKind::Strain, LinkConfig::default()).unwrap();
    let motion = NodeLink::connect(motion, NodeKind::Motion, LinkConfig::default()).unwrap();

    let mut acquisition = Acquisition::start(strain, motion, AcquisitionConfig::default());

    let mut strain_times = Vec::new();
    let mut motion_times = Vec::new();
    while strain_times.len() < 3 || motion_times.len() < 10 {
        let sample = timeout(Duration::from_secs(5), acquisition.next_sample())
            .await
            .expect("no sample within 5 s")
            .expect("readers ended early");

        match (&sample.kind, &sample.record) {
            (NodeKind::Strain, Record::Strain(record)) => strain_times.push(record.timestamp),
            (NodeKind::Motion, Record::Motion(record)) => motion_times.push(record.timestamp),
            other => panic!("sample tagged with the wrong node: {:?}", other),
        }
    }

    let stats = acquisition.stop().await.unwrap();
    assert!(strain_times.windows(2).all(|w| w[1] > w[0]));
    assert!(motion_times.windows(2).all(|w| w[1] > w[0]));
    assert!(stats.strain.samples_decoded >= strain_times.len() as u64);
    assert!(stats.motion.samples_decoded >= motion_times.len() as u64);
}

#[tokio::test]
async fn stop_releases_readers_blocked_on_a_full_channel() {
    let (strain, _strain_handles) = SimulatedNode::strain(0, 50);
    let (motion, _motion_handles) = SimulatedNode::motion(10);
    let strain = NodeLink::connect(strain, NodeKind::Strain, LinkConfig::default()).unwrap();
    let motion = NodeLink::connect(motion, NodeKind::Motion, LinkConfig::default()).unwrap();

    let config = AcquisitionConfig {
        channel_capacity: 1,
        ..AcquisitionConfig::default()
    };
    let acquisition = Acquisition::start(strain, motion, config);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let stats = timeout(Duration::from_secs(5), acquisition.stop())
        .await
        .expect("readers did not stop")
        .unwrap();
    assert!(stats.motion.samples_decoded >= 1);
}

#[tokio::test]
async fn closed_port_surfaces_on_stop() {
    let (host, mut node) = MemoryTransport::pair();
    node.write_str("STRAIN_ARDUINO_READY\n").unwrap();
    let strain = NodeLink::connect(host, NodeKind::Strain, LinkConfig::default()).unwrap();

    let (motion, _motion_handles) = SimulatedNode::motion(10);
    let motion = NodeLink::connect(motion, NodeKind::Motion, LinkConfig::default()).unwrap();

    let acquisition = Acquisition::start(strain, motion, AcquisitionConfig::default());
    drop(node);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let result = acquisition.stop().await;
    assert!(matches!(result, Err(LinkError::Closed)));
}

#[tokio::test]
async fn dropping_acquisition_releases_silent_links() {
    let (strain_host, mut strain_node) = MemoryTransport::pair();
    let (motion_host, mut motion_node) = MemoryTransport::pair();
    strain_node.write_str("STRAIN_ARDUINO_READY\n").unwrap();
    motion_node.write_str("MOTION_ARDUINO_READY\n").unwrap();
    let strain = NodeLink::connect(strain_host, NodeKind::Strain, LinkConfig::default()).unwrap();
    let motion = NodeLink::connect(motion_host, NodeKind::Motion, LinkConfig::default()).unwrap();

    let acquisition = Acquisition::start(strain, motion, AcquisitionConfig::default());
    drop(acquisition);
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Readers dropped their links, which closes the host ends
    assert!(matches!(strain_node.write_str("TARE\n"), Err(LinkError::Closed)));
    assert!(matches!(motion_node.write_str("CALIBRATE\n"), Err(LinkError::Closed)));
}

#[test]
fn config_loads_from_json() {
    let config = AcquisitionConfig::from_json(r#"{ "channel_capacity": 32, "idle_sleep_ms": 2 }"#)
        .unwrap();
    assert_eq!(config.channel_capacity, 32);
    assert_eq!(config.idle_sleep_ms, 2);
}
