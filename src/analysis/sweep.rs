//! Window-size sensitivity: the windowed metrics recomputed over several trailing windows.

use crate::analysis::stability::{motion_smoothness, movement_stability_index};
use crate::core::{JointRecord, Point2};
use crate::error::MonitorResult;
use serde::Serialize;

/// Metrics over the trailing `window` samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepRow {
    pub window: usize,
    pub motion_smoothness: Option<f64>,
    pub msi: Option<f64>,
}

/// Recomputes motion smoothness and MSI over the last `w` samples for every `w` in `windows`.
///
/// A window longer than the recorded data uses all of it. `trajectories` and `centers` are
/// parallel series and must have equal length.
pub fn window_sweep(
    angles: &[f64],
    trajectories: &[JointRecord],
    centers: &[Point2],
    windows: &[usize],
) -> MonitorResult<Vec<SweepRow>> {
    windows
        .iter()
        .map(|&window| {
            let msi = movement_stability_index(tail(trajectories, window), tail(centers, window))?;
            Ok(SweepRow {
                window,
                motion_smoothness: motion_smoothness(tail(angles, window)),
                msi,
            })
        })
        .collect()
}

fn tail<T>(values: &[T], window: usize) -> &[T] {
    &values[values.len().saturating_sub(window)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;

    fn still(n: usize) -> (Vec<JointRecord>, Vec<Point2>) {
        let record = JointRecord::from_xy(&[(10.0, 10.0), (20.0, 20.0)]);
        (vec![record; n], vec![Point2::new(15.0, 15.0); n])
    }

    #[test]
    fn test_windows_use_trailing_samples() {
        // a jump early on, flat afterwards
        let angles = [0.0, 5.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let (trajectories, centers) = still(angles.len());
        let rows = window_sweep(&angles, &trajectories, &centers, &[4, 8]).unwrap();

        assert_eq!(rows[0].window, 4);
        assert_eq!(rows[0].motion_smoothness, Some(0.0));
        assert!(rows[1].motion_smoothness.unwrap() > 0.0);
        assert_eq!(rows[0].msi, Some(0.0));
    }

    #[test]
    fn test_oversized_window_uses_everything() {
        let angles = [1.0, 2.0, 4.0, 8.0];
        let (trajectories, centers) = still(4);
        let rows = window_sweep(&angles, &trajectories, &centers, &[4, 100]).unwrap();
        assert_eq!(rows[0].motion_smoothness, rows[1].motion_smoothness);
    }

    #[test]
    fn test_short_windows_are_undefined() {
        let (trajectories, centers) = still(3);
        let rows = window_sweep(&[1.0, 2.0, 3.0], &trajectories, &centers, &[1, 3]).unwrap();
        assert_eq!(rows[0].msi, None);
        assert_eq!(rows[0].motion_smoothness, None);
        assert_eq!(rows[1].msi, Some(0.0));
    }

    #[test]
    fn test_mismatched_series_fail() {
        let (trajectories, _) = still(5);
        let (_, centers) = still(3);
        let err = window_sweep(&[], &trajectories, &centers, &[5]).unwrap_err();
        assert!(matches!(err, MonitorError::DimensionMismatch { .. }));
    }
}
