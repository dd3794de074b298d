//! Joint Angle Dynamics (JAD): per-joint angle features and the cross-joint coordination index.
//!
//! Each feature is a standalone function over an angle series; [`JadAnalyzer`] only strings
//! them together for a window of frames and keeps FFT plans warm between windows.

use crate::analysis::coordination::coordination_index;
use crate::analysis::derivatives::{DerivativeOrder, Dynamics};
use crate::analysis::dtw::dtw_distance;
use crate::analysis::geometry::{record_angle, JointTriple};
use crate::analysis::spectral::WelchEstimator;
use crate::analysis::stats;
use crate::core::JointRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Features of one named joint over the window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct JointFeatures {
    /// Standard deviation of the raw angle series.
    pub variability: f64,
    pub mean_squared_jerk: f64,
    /// `None` when the series carries no spectral energy (it never moved).
    pub high_freq_energy_ratio: Option<f64>,
}

/// Aggregated JAD features for one window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JadReport {
    pub joints: BTreeMap<String, JointFeatures>,
    pub coordination_index: f64,
    /// Frames of the window in which every named angle was defined.
    pub frames_used: usize,
}

/// Angle series of every named joint chain, in radians.
///
/// A frame in which any chain has an undefined angle is skipped for all chains, which keeps
/// the series aligned in time.
pub fn angle_series<'a, I>(
    frames: I,
    triples: &BTreeMap<String, JointTriple>,
) -> BTreeMap<String, Vec<f64>>
where
    I: IntoIterator<Item = &'a JointRecord>,
{
    let mut series: BTreeMap<String, Vec<f64>> =
        triples.keys().map(|name| (name.clone(), Vec::new())).collect();
    for record in frames {
        let angles: Option<Vec<f64>> = triples
            .values()
            .map(|triple| record_angle(record, *triple))
            .collect();
        if let Some(angles) = angles {
            for (values, angle) in series.values_mut().zip(angles) {
                values.push(angle);
            }
        }
    }
    series
}

/// Standard deviation of an angle series.
pub fn variability(angles: &[f64]) -> Option<f64> {
    stats::std_dev(angles)
}

/// Mean of the squared angular jerk; needs four samples.
pub fn mean_squared_jerk(angles: &[f64], dt: f64) -> Option<f64> {
    let dynamics = Dynamics::compute(angles, dt)?;
    let squared: Vec<f64> = dynamics.jerk.iter().map(|j| j * j).collect();
    stats::mean(&squared)
}

/// How closely two angle series follow each other once phase differences are warped away.
///
/// Lower means more similar. Not part of [`JadReport`]; callers ask for it explicitly.
pub fn adaptability(a: &[f64], b: &[f64]) -> Option<f64> {
    dtw_distance(a, b)
}

/// Computes [`JadReport`]s for windows of frames.
pub struct JadAnalyzer {
    fps: f64,
    welch: WelchEstimator,
}

impl JadAnalyzer {
    pub fn new(fps: f64, spectral_segment_len: usize) -> Self {
        Self {
            fps,
            welch: WelchEstimator::new(spectral_segment_len),
        }
    }

    /// Features of every named joint plus the coordination index.
    ///
    /// `None` until at least four aligned frames are available, since jerk is undefined below
    /// that, or when `triples` is empty.
    pub fn analyze<'a, I>(
        &mut self,
        frames: I,
        triples: &BTreeMap<String, JointTriple>,
    ) -> Option<JadReport>
    where
        I: IntoIterator<Item = &'a JointRecord>,
    {
        let series = angle_series(frames, triples);
        self.analyze_series(&series)
    }

    /// Same as [`JadAnalyzer::analyze`] for precomputed angle series of equal length.
    pub fn analyze_series(&mut self, series: &BTreeMap<String, Vec<f64>>) -> Option<JadReport> {
        let frames_used = series.values().next()?.len();
        if frames_used < DerivativeOrder::Jerk.min_samples()
            || series.values().any(|s| s.len() != frames_used)
        {
            return None;
        }

        let dt = 1.0 / self.fps;
        let mut joints = BTreeMap::new();
        for (name, angles) in series {
            let features = JointFeatures {
                variability: variability(angles)?,
                mean_squared_jerk: mean_squared_jerk(angles, dt)?,
                high_freq_energy_ratio: self.welch.high_freq_energy_ratio(angles, self.fps),
            };
            joints.insert(name.clone(), features);
        }

        let matrix: Vec<Vec<f64>> = series.values().cloned().collect();
        let coordination_index = coordination_index(&matrix)?;

        Some(JadReport {
            joints,
            coordination_index,
            frames_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2;

    fn triples() -> BTreeMap<String, JointTriple> {
        [("elbow", JointTriple::new(0, 1, 2)), ("wrist", JointTriple::new(1, 2, 3))]
            .into_iter()
            .map(|(n, t)| (n.to_string(), t))
            .collect()
    }

    fn arm(frame: usize) -> JointRecord {
        let swing = (frame as f64 * 0.3).sin() * 10.0;
        JointRecord::from_xy(&[
            (100.0, 100.0),
            (130.0, 100.0),
            (150.0, 120.0 + swing),
            (170.0, 125.0 + swing * 1.5),
        ])
    }

    #[test]
    fn test_undefined_frames_are_skipped_for_all_joints() {
        let mut broken = arm(1);
        broken.set(3, Point2::ORIGIN);
        let frames = vec![arm(0), broken, arm(2)];
        let series = angle_series(&frames, &triples());
        assert_eq!(series["elbow"].len(), 2);
        assert_eq!(series["wrist"].len(), 2);
    }

    #[test]
    fn test_report_needs_four_frames() {
        let mut jad = JadAnalyzer::new(30.0, 256);
        let frames: Vec<JointRecord> = (0..3).map(arm).collect();
        assert!(jad.analyze(&frames, &triples()).is_none());

        let frames: Vec<JointRecord> = (0..30).map(arm).collect();
        let report = jad.analyze(&frames, &triples()).unwrap();
        assert_eq!(report.frames_used, 30);
        assert_eq!(report.joints.len(), 2);
        assert!(report.coordination_index > 0.0 && report.coordination_index <= 1.0);
        for features in report.joints.values() {
            assert!(features.variability > 0.0);
            assert!(features.mean_squared_jerk > 0.0);
            let ratio = features.high_freq_energy_ratio.unwrap();
            assert!((0.0..=1.0).contains(&ratio));
        }
    }

    #[test]
    fn test_static_pose_is_fully_coordinated() {
        let mut jad = JadAnalyzer::new(30.0, 256);
        let frames = vec![arm(0); 10];
        let report = jad.analyze(&frames, &triples()).unwrap();
        assert_eq!(report.coordination_index, 1.0);
        for features in report.joints.values() {
            assert_eq!(features.variability, 0.0);
            assert_eq!(features.mean_squared_jerk, 0.0);
            assert_eq!(features.high_freq_energy_ratio, None);
        }
    }

    #[test]
    fn test_adaptability_is_dtw() {
        assert_eq!(adaptability(&[0.1, 0.2], &[0.1, 0.2]), Some(0.0));
        assert!(adaptability(&[0.1, 0.2], &[0.5, 0.9]).unwrap() > 0.0);
    }
}
