//! End-to-end motion node behavior
//!
//! Fused orientations, held estimates on bus failure, the synthesized
//! sawtooth and the blocking bias calibration, all observed through the
//! encoded `MOTION,...` lines.

#[macro_use]
mod common;

use quickdeck_core::{
    channel::RawMotion,
    node::MotionConfig,
    protocol::{CalibrationPhase, Frame},
    MotionRecord, Record,
};

use common::{decode_all, motion_loop, records, MotionLoop, SimClock, LEVEL};

fn motion_records(node_loop: &mut MotionLoop) -> Vec<MotionRecord> {
    let frames = decode_all(&node_loop.link_mut().take_output());
    records(&frames)
        .into_iter()
        .filter_map(|record| match record {
            Record::Motion(record) => Some(record),
            Record::Strain(_) => None,
        })
        .collect()
}

fn run(node_loop: &mut MotionLoop, clock: &mut SimClock, until_ms: u64) {
    while clock.now() < until_ms {
        let now = clock.step();
        node_loop.poll(now);
    }
}

#[test]
fn boot_lists_sensors_then_banner() {
    let (mut node_loop, _handles) = motion_loop(MotionConfig::default());
    node_loop.boot();
    assert_eq!(
        node_loop.link_mut().take_output(),
        ["Sensor 1 initialized", "Sensor 2 initialized", "MOTION_ARDUINO_READY"]
    );
}

#[test]
fn steady_tilt_converges_to_accelerometer_angle() {
    let (mut node_loop, handles) = motion_loop(MotionConfig::default());
    node_loop.boot();
    node_loop.link_mut().take_output();

    // 30° roll: -ax / az = tan(30°)
    handles[0].set_raw(RawMotion { ax: -8192, ay: 0, az: 14189, ..LEVEL });

    let mut clock = SimClock::new(1);
    run(&mut node_loop, &mut clock, 5_000);

    let last = *motion_records(&mut node_loop).last().unwrap();
    assert_within_tolerance!(last.modules[0].roll, 30.0, 0.1);
    assert_within_tolerance!(last.modules[0].pitch, 0.0, 0.01);
    assert_within_tolerance!(last.modules[0].yaw, 0.0, 0.01);
}

#[test]
fn constant_yaw_rate_integrates_linearly() {
    let (mut node_loop, handles) = motion_loop(MotionConfig::default());
    node_loop.boot();
    node_loop.link_mut().take_output();

    // 10 °/s at 131 LSB per °/s
    handles[1].set_raw(RawMotion { gz: 1310, ..LEVEL });

    let mut clock = SimClock::new(10);
    run(&mut node_loop, &mut clock, 1_000);

    let records = motion_records(&mut node_loop);
    assert_eq!(records.len(), 100);
    for pair in records.windows(2) {
        let step = pair[1].modules[1].yaw - pair[0].modules[1].yaw;
        assert_within_tolerance!(step, 0.1, 0.011);
    }
    assert_within_tolerance!(records[99].modules[1].yaw, 10.0, 0.1);
}

#[test]
fn bus_failure_holds_last_orientation() {
    let (mut node_loop, handles) = motion_loop(MotionConfig::default());
    node_loop.boot();
    node_loop.link_mut().take_output();
    handles[0].set_raw(RawMotion { gz: 655, ..LEVEL });

    let mut clock = SimClock::new(10);
    run(&mut node_loop, &mut clock, 200);
    let before = *motion_records(&mut node_loop).last().unwrap();

    handles[0].fail_reads(true);
    run(&mut node_loop, &mut clock, 400);
    let held = motion_records(&mut node_loop);
    assert_eq!(held.len(), 20);
    assert!(held.iter().all(|r| r.modules[0] == before.modules[0]));
    assert_eq!(node_loop.stats().read_failures, 20);

    handles[0].fail_reads(false);
    run(&mut node_loop, &mut clock, 410);
    let resumed = motion_records(&mut node_loop);
    assert!(resumed[0].modules[0].yaw > before.modules[0].yaw);
}

#[test]
fn synthesized_module_is_a_sawtooth_over_module_two() {
    let (mut node_loop, _handles) = motion_loop(MotionConfig::default());
    node_loop.boot();
    node_loop.link_mut().take_output();

    let mut clock = SimClock::new(10);
    run(&mut node_loop, &mut clock, 3_020);

    let records = motion_records(&mut node_loop);
    let offsets: Vec<f32> = records
        .iter()
        .map(|r| r.modules[2].pitch - r.modules[1].pitch)
        .collect();

    // 0.1° steps up to 30°, then back to 0
    assert_within_tolerance!(offsets[0], 0.1, 0.006);
    assert_within_tolerance!(offsets[299], 30.0, 0.006);
    assert_within_tolerance!(offsets[300], 0.0, 0.006);
    assert_within_tolerance!(offsets[301], 0.1, 0.006);
    assert!(offsets.iter().all(|o| (-0.006..=30.006).contains(o)));

    for r in &records {
        assert_eq!(r.modules[2].roll, r.modules[1].roll);
        assert_eq!(r.modules[2].yaw, r.modules[1].yaw);
    }
}

#[test]
fn calibration_blocks_and_removes_bias() {
    let config = MotionConfig::default().with_calibration_iterations(50);
    let (mut node_loop, handles) = motion_loop(config);
    node_loop.boot();
    node_loop.link_mut().take_output();

    let biased = RawMotion { gx: 26, gy: -13, gz: 131, ..LEVEL };
    handles[0].set_raw(biased);
    handles[1].set_raw(biased);

    node_loop.link_mut().push_input("CALIBRATE\n");
    node_loop.poll(5);
    assert_eq!(
        decode_all(&node_loop.link_mut().take_output()),
        [
            Frame::Calibrating(CalibrationPhase::Start),
            Frame::Calibrating(CalibrationPhase::Complete),
        ]
    );
    assert_eq!(handles[0].reads(), 50);

    let mut clock = SimClock::new(10);
    run(&mut node_loop, &mut clock, 1_000);
    let last = *motion_records(&mut node_loop).last().unwrap();
    assert_within_tolerance!(last.modules[0].yaw, 0.0, 1e-3);
    assert_within_tolerance!(last.modules[1].yaw, 0.0, 1e-3);
}

#[test]
fn strain_commands_are_ignored() {
    let (mut node_loop, _handles) = motion_loop(MotionConfig::default());
    node_loop.boot();
    node_loop.link_mut().take_output();

    node_loop.link_mut().push_input("TARE\nCALIBRATE,1,2.0\n");
    node_loop.poll(1);
    node_loop.poll(2);
    assert!(node_loop.link_mut().take_output().is_empty());
    assert_eq!(node_loop.stats().commands_dropped, 2);
}
