//! Offline replay of exported keypoint CSVs through a [`StreamAnalyzer`].
//!
//! The input holds one row per keypoint: `Frame,Person,Keypoint_Index,Keypoint_X,Keypoint_Y`.
//! Keypoints a frame does not list stay undetected; frames without the selected person are
//! skipped, leaving a gap in the frame indices.
use crate::config::MonitorConfig;
use crate::core::{JointRecord, Point2};
use crate::data::registry::SinkRegistry;
use crate::data::storage::MetricsCsvWriter;
use crate::engine::StreamAnalyzer;
use crate::error::{MonitorError, MonitorResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct KeypointRow {
    #[serde(rename = "Frame")]
    frame: u64,
    #[serde(rename = "Person")]
    person: u32,
    #[serde(rename = "Keypoint_Index")]
    keypoint: usize,
    #[serde(rename = "Keypoint_X")]
    x: f64,
    #[serde(rename = "Keypoint_Y")]
    y: f64,
}

/// Reads the frames of `person`, ordered by frame index.
pub fn read_keypoint_csv<R: io::Read>(
    reader: R,
    person: u32,
    joint_count: usize,
) -> MonitorResult<Vec<(u64, JointRecord)>> {
    let mut frames: BTreeMap<u64, JointRecord> = BTreeMap::new();
    for row in csv::Reader::from_reader(reader).deserialize() {
        let row: KeypointRow = row?;
        if row.person != person {
            continue;
        }
        if row.keypoint >= joint_count {
            return Err(MonitorError::Input(format!(
                "frame {}: keypoint index {} outside the {joint_count}-joint layout",
                row.frame, row.keypoint
            )));
        }
        frames
            .entry(row.frame)
            .or_insert_with(|| JointRecord::undetected(joint_count))
            .set(row.keypoint, Point2::new(row.x, row.y));
    }
    Ok(frames.into_iter().collect())
}

pub fn read_keypoint_file(
    path: &Path,
    person: u32,
    joint_count: usize,
) -> MonitorResult<Vec<(u64, JointRecord)>> {
    read_keypoint_csv(File::open(path)?, person, joint_count)
}

/// Outcome of replaying one stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub fired_frames: Vec<u64>,
    pub output_dir: Option<PathBuf>,
}

/// Feeds `frames` through `analyzer`, writing every report when a metrics writer is given.
pub fn replay<W: io::Write>(
    analyzer: &mut StreamAnalyzer,
    frames: Vec<(u64, JointRecord)>,
    mut metrics: Option<&mut MetricsCsvWriter<W>>,
) -> MonitorResult<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (frame_index, record) in frames {
        let report = analyzer.ingest(record, frame_index)?;
        if let Some(writer) = metrics.as_deref_mut() {
            writer.write(&report)?;
        }
        if report.triggered {
            summary.fired_frames.push(frame_index);
        }
        summary.frames += 1;
    }
    if let Some(writer) = metrics {
        writer.flush()?;
    }
    Ok(summary)
}

/// Replays one keypoint file into `output_dir`: `metrics.csv` plus the configured sink's output.
#[instrument(skip(config, registry), fields(sink = %config.storage.sink))]
pub fn replay_file(
    config: &MonitorConfig,
    registry: &SinkRegistry,
    input: &Path,
    person: u32,
    output_dir: &Path,
) -> MonitorResult<ReplaySummary> {
    let frames = read_keypoint_file(input, person, config.analysis.joint_count)?;
    let sink = registry.create(&config.storage.sink, output_dir)?;
    let mut analyzer = StreamAnalyzer::new(config, sink)?;
    let mut metrics = MetricsCsvWriter::create(output_dir)?;

    let mut summary = replay(&mut analyzer, frames, Some(&mut metrics))?;
    summary.output_dir = Some(output_dir.to_path_buf());
    info!(
        frames = summary.frames,
        triggers = summary.fired_frames.len(),
        "Replay finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Frame,Person,Keypoint_Index,Keypoint_X,Keypoint_Y
0,0,0,10.5,20.0
0,0,2,11.0,21.0
0,1,0,99.0,99.0
2,0,1,12.0,22.0
";

    #[test]
    fn test_groups_rows_by_frame() {
        let frames = read_keypoint_csv(SAMPLE.as_bytes(), 0, 3).unwrap();
        assert_eq!(frames.len(), 2);
        let (index, record) = &frames[0];
        assert_eq!(*index, 0);
        assert_eq!(record.point(0), Some(Point2::new(10.5, 20.0)));
        assert_eq!(record.valid_point(1), None);
        assert_eq!(frames[1].0, 2);
    }

    #[test]
    fn test_selects_person() {
        let frames = read_keypoint_csv(SAMPLE.as_bytes(), 1, 3).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].1.point(0), Some(Point2::new(99.0, 99.0)));
    }

    #[test]
    fn test_keypoint_outside_layout() {
        let err = read_keypoint_csv(SAMPLE.as_bytes(), 0, 2).unwrap_err();
        assert!(matches!(err, MonitorError::Input(_)));
    }

    #[test]
    fn test_malformed_row() {
        let bad = "Frame,Person,Keypoint_Index,Keypoint_X,Keypoint_Y\n0,0,zero,1.0,1.0\n";
        let err = read_keypoint_csv(bad.as_bytes(), 0, 17).unwrap_err();
        assert!(matches!(err, MonitorError::Csv(_)));
    }
}
