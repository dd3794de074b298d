//! Per-stream analyzer: window buffers, metrics and trigger state for one body.
//!
//! A [`StreamAnalyzer`] owns everything a stream mutates, so analysing several streams at once
//! only needs one analyzer per stream and no locking.
//!
//! # Example
//! ```
//! use kinematic_monitor::config::MonitorConfig;
//! use kinematic_monitor::core::JointRecord;
//! use kinematic_monitor::data::storage::CollectingSink;
//! use kinematic_monitor::engine::StreamAnalyzer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = CollectingSink::new();
//! let mut analyzer = StreamAnalyzer::new(&MonitorConfig::default(), Box::new(sink.clone()))?;
//!
//! let still = JointRecord::from_xy(&[(100.0, 100.0); 17]);
//! let first = analyzer.ingest(still.clone(), 0)?;
//! assert_eq!(first.msi, None);
//! let second = analyzer.ingest(still, 1)?;
//! assert_eq!(second.msi, Some(0.0));
//! assert!(sink.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::analysis::geometry::{center_of_mass, record_angle, Connection, JointTriple};
use crate::analysis::jad::JadAnalyzer;
use crate::analysis::stability::{
    dynamic_coordination_ratio, motion_smoothness, movement_stability_index,
};
use crate::analysis::sweep::{window_sweep, SweepRow};
use crate::analysis::trajectory::trajectory_smoothness;
use crate::config::{AnalysisConfig, MonitorConfig};
use crate::core::{JointRecord, MetricReport, Point2, TriggerEvent, TriggerSink};
use crate::data::window::WindowBuffer;
use crate::error::{MonitorError, MonitorResult};
use crate::trigger::TriggerController;
use std::collections::BTreeMap;
use tracing::debug;

pub struct StreamAnalyzer {
    analysis: AnalysisConfig,
    connections: Vec<Connection>,
    triples: BTreeMap<String, JointTriple>,
    angles: WindowBuffer<f64>,
    trajectories: WindowBuffer<JointRecord>,
    centers: WindowBuffer<Point2>,
    jad: JadAnalyzer,
    trigger: TriggerController,
    sink: Box<dyn TriggerSink>,
    last_frame: Option<u64>,
}

impl StreamAnalyzer {
    /// Validates `config` and builds empty buffers of `analysis.window_size` frames.
    pub fn new(config: &MonitorConfig, sink: Box<dyn TriggerSink>) -> MonitorResult<Self> {
        config.validate()?;
        let analysis = config.analysis.clone();
        let window = analysis.window_size;
        Ok(Self {
            connections: config.skeleton.connections.clone(),
            triples: config.joints.triples.clone(),
            angles: WindowBuffer::new(window),
            trajectories: WindowBuffer::new(window),
            centers: WindowBuffer::new(window),
            jad: JadAnalyzer::new(analysis.fps, analysis.spectral_segment_len),
            trigger: TriggerController::new(config.trigger),
            sink,
            last_frame: None,
            analysis,
        })
    }

    /// Analyses one frame.
    ///
    /// Frame indices must strictly increase; gaps are allowed and derivatives simply run over
    /// whatever is buffered. A trigger, if any, reaches the sink before this returns.
    pub fn ingest(&mut self, record: JointRecord, frame_index: u64) -> MonitorResult<MetricReport> {
        if record.len() != self.analysis.joint_count {
            return Err(MonitorError::JointCountMismatch {
                expected: self.analysis.joint_count,
                found: record.len(),
            });
        }
        if let Some(previous) = self.last_frame {
            if frame_index <= previous {
                return Err(MonitorError::FrameOrder {
                    previous,
                    current: frame_index,
                });
            }
        }
        self.last_frame = Some(frame_index);

        let angle = record_angle(&record, self.analysis.tracked_angle)
            .map(|radians| self.analysis.angle_unit.convert(radians));
        if let Some(angle) = angle {
            self.angles.push(angle);
        }
        let center = center_of_mass(&record, self.analysis.com_valid_joints_only).ok_or(
            MonitorError::JointCountMismatch {
                expected: self.analysis.joint_count,
                found: 0,
            },
        )?;
        let dcr = dynamic_coordination_ratio(&record, &self.connections);
        self.trajectories.push(record);
        self.centers.push(center);

        let smoothness = motion_smoothness(self.angles.contiguous());
        let trajectories = self.trajectories.contiguous();
        let msi = movement_stability_index(trajectories, self.centers.contiguous())?;

        // Undefined while any buffered frame lost the joint: the path must stay uniformly sampled.
        let trajectory = self.analysis.trajectory_joint.and_then(|joint| {
            let path: Vec<Point2> = trajectories
                .iter()
                .map(|r| r.valid_point(joint))
                .collect::<Option<_>>()?;
            trajectory_smoothness(&path, self.analysis.fps, self.analysis.spline_smoothing)
        });

        let jad = if self.analysis.jad_enabled && self.trajectories.is_full() {
            self.jad.analyze(self.trajectories.values(), &self.triples)
        } else {
            None
        };

        let triggered = self.trigger.evaluate(frame_index, smoothness, msi);
        if triggered {
            if let Some(record) = self.trajectories.latest() {
                self.sink.on_trigger(TriggerEvent {
                    frame_index,
                    record: record.clone(),
                    angle: self.angles.latest().copied(),
                    motion_smoothness: smoothness,
                    msi,
                    detected_at: chrono::Utc::now(),
                });
            }
        }

        debug!(
            frame = frame_index,
            angle = ?angle,
            smoothness = ?smoothness,
            msi = ?msi,
            dcr,
            triggered,
            "frame analysed"
        );

        Ok(MetricReport {
            frame_index,
            angle,
            motion_smoothness: smoothness,
            msi,
            dcr,
            trajectory_smoothness: trajectory,
            jad,
            triggered,
        })
    }

    /// Motion smoothness and MSI over trailing sub-windows of the buffered frames.
    pub fn sweep(&mut self, windows: &[usize]) -> MonitorResult<Vec<SweepRow>> {
        window_sweep(
            self.angles.contiguous(),
            self.trajectories.contiguous(),
            self.centers.contiguous(),
            windows,
        )
    }

    /// Drops all buffered frames and re-arms the trigger.
    pub fn reset(&mut self) {
        self.angles.clear();
        self.trajectories.clear();
        self.centers.clear();
        self.trigger.reset();
        self.last_frame = None;
    }

    pub fn window_size(&self) -> usize {
        self.trajectories.capacity()
    }

    /// Frames currently buffered.
    pub fn buffered_frames(&self) -> usize {
        self.trajectories.size()
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn last_fired_frame(&self) -> Option<u64> {
        self.trigger.last_fired_frame()
    }
}
