//! End-to-end replay of keypoint CSV exports through the sink registry.

use kinematic_monitor::data::registry::SinkRegistry;
use kinematic_monitor::data::storage::{CollectingSink, METRICS_FILE, TRIGGERS_FILE};
use kinematic_monitor::replay::{read_keypoint_file, replay_file};
use kinematic_monitor::MonitorConfig;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// A person whose right arm flails every other frame while the rest stays put.
fn write_recording(path: &Path, frames: u64) {
    let mut csv = String::from("Frame,Person,Keypoint_Index,Keypoint_X,Keypoint_Y\n");
    for frame in 0..frames {
        for joint in 0..17u32 {
            let (mut x, mut y) = (100.0 + 10.0 * joint as f64, 80.0 + 20.0 * joint as f64);
            if joint == 7 && frame % 2 == 1 {
                x += 90.0;
                y -= 60.0;
            }
            writeln!(csv, "{frame},0,{joint},{x},{y}").unwrap();
        }
        // a bystander that must be ignored
        writeln!(csv, "{frame},1,0,5.0,5.0").unwrap();
    }
    fs::write(path, csv).unwrap();
}

fn config(sink: &str) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.storage.sink = sink.to_string();
    config.trigger.cooldown_frames = 10;
    config
}

#[test]
fn test_csv_replay_writes_metrics_and_triggers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("walk.csv");
    write_recording(&input, 40);
    let output = dir.path().join("out");

    let summary = replay_file(&config("csv"), &SinkRegistry::new(), &input, 0, &output).unwrap();
    assert_eq!(summary.frames, 40);
    assert!(!summary.fired_frames.is_empty());
    assert!(summary.fired_frames.windows(2).all(|w| w[1] - w[0] >= 10));

    let metrics = fs::read_to_string(output.join(METRICS_FILE)).unwrap();
    assert_eq!(metrics.lines().count(), 41);
    // the first frame has no MSI yet: an empty cell, not zero
    let first: Vec<&str> = metrics.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(first[0], "0");
    assert_eq!(first[3], "");

    let triggers = fs::read_to_string(output.join(TRIGGERS_FILE)).unwrap();
    assert_eq!(triggers.lines().count(), summary.fired_frames.len() + 1);
    assert!(triggers.starts_with("frame,angle,smoothness,msi"));
}

#[test]
fn test_json_replay_saves_triggering_frames() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("walk.csv");
    write_recording(&input, 20);
    let output = dir.path().join("json");

    let summary = replay_file(&config("json"), &SinkRegistry::new(), &input, 0, &output).unwrap();
    for frame in &summary.fired_frames {
        assert!(output.join(format!("saved_frame_{frame}.json")).exists());
    }
}

#[test]
fn test_custom_sink_sees_every_trigger() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("walk.csv");
    write_recording(&input, 40);

    let collected = CollectingSink::new();
    let handle = collected.clone();
    let mut registry = SinkRegistry::new();
    registry.register("memory", move |_| Ok(Box::new(handle.clone())));

    let summary = replay_file(&config("memory"), &registry, &input, 0, dir.path()).unwrap();
    assert_eq!(collected.fired_frames(), summary.fired_frames);
    let event = &collected.events()[0];
    assert_eq!(event.record.len(), 17);
    assert!(event.msi.is_some());
}

#[test]
fn test_missing_person_yields_no_frames() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("walk.csv");
    write_recording(&input, 5);
    assert!(read_keypoint_file(&input, 3, 17).unwrap().is_empty());
}

#[test]
fn test_unknown_sink_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("walk.csv");
    write_recording(&input, 5);
    let result = replay_file(&config("hdf5"), &SinkRegistry::new(), &input, 0, dir.path());
    assert!(result.is_err());
}
