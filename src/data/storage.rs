//! Trigger sinks and the per-frame metrics writer.
//!
//! Sinks receive a [`TriggerEvent`] and never report back to the analyzer, so every sink
//! here logs its own failures and carries on with the next event.
use crate::core::{MetricReport, TriggerEvent, TriggerSink};
use crate::error::MonitorResult;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

/// File name used by [`CsvTriggerSink`].
pub const TRIGGERS_FILE: &str = "triggers.csv";
/// File name used by [`MetricsCsvWriter::create`].
pub const METRICS_FILE: &str = "metrics.csv";

/// Renders an undefined value as an empty cell so it never reads as zero.
fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Appends one row per trigger to `triggers.csv`.
pub struct CsvTriggerSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvTriggerSink {
    pub fn create(dir: &Path) -> MonitorResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(TRIGGERS_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["frame", "angle", "smoothness", "msi"])?;
        writer.flush()?;
        info!(path = %path.display(), "CSV trigger sink ready");
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_event(&mut self, event: &TriggerEvent) -> MonitorResult<()> {
        self.writer.write_record([
            event.frame_index.to_string(),
            cell(event.angle),
            cell(event.motion_smoothness),
            cell(event.msi),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

impl TriggerSink for CsvTriggerSink {
    fn on_trigger(&mut self, event: TriggerEvent) {
        if let Err(e) = self.write_event(&event) {
            error!(frame = event.frame_index, path = %self.path.display(), error = %e, "Failed to write trigger row");
        }
    }
}

/// Writes every triggering frame to its own `saved_frame_{index}.json`.
pub struct JsonTriggerSink {
    dir: PathBuf,
}

impl JsonTriggerSink {
    pub fn create(dir: &Path) -> MonitorResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn frame_path(&self, frame_index: u64) -> PathBuf {
        self.dir.join(format!("saved_frame_{frame_index}.json"))
    }

    fn write_event(&self, event: &TriggerEvent) -> MonitorResult<()> {
        let file = File::create(self.frame_path(event.frame_index))?;
        serde_json::to_writer_pretty(io::BufWriter::new(file), event)?;
        Ok(())
    }
}

impl TriggerSink for JsonTriggerSink {
    fn on_trigger(&mut self, event: TriggerEvent) {
        if let Err(e) = self.write_event(&event) {
            error!(frame = event.frame_index, error = %e, "Failed to save triggering frame");
        }
    }
}

/// Only logs each trigger.
#[derive(Debug, Default)]
pub struct LogTriggerSink;

impl TriggerSink for LogTriggerSink {
    fn on_trigger(&mut self, event: TriggerEvent) {
        warn!(
            frame = event.frame_index,
            angle = ?event.angle,
            smoothness = ?event.motion_smoothness,
            msi = ?event.msi,
            "Abnormal movement detected"
        );
    }
}

/// Keeps events in memory. Clones share the same event list.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<TriggerEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TriggerEvent> {
        self.lock().clone()
    }

    pub fn fired_frames(&self) -> Vec<u64> {
        self.lock().iter().map(|e| e.frame_index).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while pushing cannot leave the Vec half-written, so a poisoned lock is usable.
    fn lock(&self) -> MutexGuard<'_, Vec<TriggerEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TriggerSink for CollectingSink {
    fn on_trigger(&mut self, event: TriggerEvent) {
        self.lock().push(event);
    }
}

/// Writes one row per [`MetricReport`]; undefined metrics are left as empty cells.
pub struct MetricsCsvWriter<W: io::Write> {
    writer: csv::Writer<W>,
}

const METRICS_HEADER: [&str; 10] = [
    "frame",
    "angle",
    "motion_smoothness",
    "msi",
    "dcr",
    "trajectory_msj",
    "trajectory_var",
    "trajectory_smoothness",
    "coordination_index",
    "triggered",
];

impl MetricsCsvWriter<File> {
    /// Creates `metrics.csv` inside `dir`.
    pub fn create(dir: &Path) -> MonitorResult<Self> {
        fs::create_dir_all(dir)?;
        let file = File::create(dir.join(METRICS_FILE))?;
        Self::from_writer(file)
    }
}

impl<W: io::Write> MetricsCsvWriter<W> {
    pub fn from_writer(inner: W) -> MonitorResult<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(METRICS_HEADER)?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, report: &MetricReport) -> MonitorResult<()> {
        let trajectory = report.trajectory_smoothness;
        self.writer.write_record([
            report.frame_index.to_string(),
            cell(report.angle),
            cell(report.motion_smoothness),
            cell(report.msi),
            report.dcr.to_string(),
            cell(trajectory.map(|t| t.msj)),
            cell(trajectory.map(|t| t.var)),
            cell(trajectory.map(|t| t.smoothness)),
            cell(report.jad.as_ref().map(|j| j.coordination_index)),
            report.triggered.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> MonitorResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> MonitorResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::MonitorError::Io(e.into_error()))
    }
}
