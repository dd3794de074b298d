//! Windowed smoothness and stability metrics plus the per-frame coordination ratio.
use crate::analysis::derivatives::finite_difference;
use crate::analysis::geometry::{limb_lengths, Connection};
use crate::analysis::stats;
use crate::core::{JointRecord, Point2};
use crate::error::{MonitorError, MonitorResult};

/// Guards the coefficient of variation against a zero mean limb length.
pub const DCR_EPSILON: f64 = 1e-5;

/// Mean absolute third difference of an angle series. Lower is smoother.
///
/// The differences are not divided by the frame interval, so this is the jerk of the raw
/// angle values rather than an angular jerk. Needs at least four samples.
pub fn motion_smoothness(angles: &[f64]) -> Option<f64> {
    let third = finite_difference(angles, 3)?;
    let magnitudes: Vec<f64> = third.iter().map(|d| d.abs()).collect();
    stats::mean(&magnitudes)
}

/// Movement Stability Index over parallel windows of full-body trajectories and centers of mass.
///
/// MSI is the mean per-(joint, axis) variance of the trajectories over time, plus the mean
/// distance the center of mass moved between consecutive frames.
///
/// Returns `Ok(None)` while fewer than two frames are buffered. Windows of different lengths
/// mean the buffers drifted out of sync and fail with [`MonitorError::DimensionMismatch`], as
/// do records with differing joint counts ([`MonitorError::JointCountMismatch`]).
pub fn movement_stability_index(
    trajectories: &[JointRecord],
    center_of_mass: &[Point2],
) -> MonitorResult<Option<f64>> {
    if trajectories.len() != center_of_mass.len() {
        return Err(MonitorError::DimensionMismatch {
            trajectories: trajectories.len(),
            center_of_mass: center_of_mass.len(),
        });
    }
    if trajectories.len() < 2 {
        return Ok(None);
    }

    let joint_count = trajectories[0].len();
    if let Some(other) = trajectories.iter().find(|r| r.len() != joint_count) {
        return Err(MonitorError::JointCountMismatch {
            expected: joint_count,
            found: other.len(),
        });
    }

    let mut axis_variances = Vec::with_capacity(joint_count * 2);
    let mut xs = Vec::with_capacity(trajectories.len());
    let mut ys = Vec::with_capacity(trajectories.len());
    for joint in 0..joint_count {
        xs.clear();
        ys.clear();
        for record in trajectories {
            let p = record.points()[joint];
            xs.push(p.x);
            ys.push(p.y);
        }
        axis_variances.extend(stats::variance(&xs));
        axis_variances.extend(stats::variance(&ys));
    }
    let trajectory_variance = stats::mean(&axis_variances).unwrap_or(0.0);

    let displacements: Vec<f64> = center_of_mass
        .windows(2)
        .map(|w| (w[1] - w[0]).norm())
        .collect();
    let com_deviation = stats::mean(&displacements).unwrap_or(0.0);

    Ok(Some(trajectory_variance + com_deviation))
}

/// Dynamic Coordination Ratio: coefficient of variation of the detected limb lengths.
///
/// With fewer than two detected limbs there is nothing to compare and the ratio is `0.0`.
pub fn dynamic_coordination_ratio(record: &JointRecord, connections: &[Connection]) -> f64 {
    let lengths = limb_lengths(record, connections);
    if lengths.len() < 2 {
        return 0.0;
    }
    match (stats::std_dev(&lengths), stats::mean(&lengths)) {
        (Some(std), Some(mean)) => std / (mean + DCR_EPSILON),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(offset: f64) -> JointRecord {
        JointRecord::from_xy(&[(10.0 + offset, 10.0), (20.0 + offset, 30.0)])
    }

    #[test]
    fn test_constant_angles_are_perfectly_smooth() {
        assert_eq!(motion_smoothness(&[1.2; 4]), Some(0.0));
        assert_eq!(motion_smoothness(&[1.2; 3]), None);
    }

    #[test]
    fn test_smoothness_is_mean_absolute_third_difference() {
        // third differences: [-3, 3]
        let angles = [0.0, 0.0, 0.0, -3.0, -6.0];
        let jerk = finite_difference(&angles, 3).unwrap();
        assert_eq!(jerk, vec![-3.0, 3.0]);
        assert_eq!(motion_smoothness(&angles), Some(3.0));
    }

    #[test]
    fn test_msi_requires_two_frames() {
        let records = vec![record_at(0.0)];
        let com = vec![Point2::new(15.0, 20.0)];
        assert!(movement_stability_index(&records, &com).unwrap().is_none());
    }

    #[test]
    fn test_msi_zero_for_static_pose() {
        let records = vec![record_at(0.0); 5];
        let com = vec![Point2::new(15.0, 20.0); 5];
        assert_eq!(movement_stability_index(&records, &com).unwrap(), Some(0.0));
    }

    #[test]
    fn test_msi_combines_variance_and_displacement() {
        // x shifts by 2 each frame for both joints: var_x = 1, var_y = 0 -> mean 0.5.
        let records = vec![record_at(0.0), record_at(2.0)];
        let com = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)];
        let msi = movement_stability_index(&records, &com).unwrap().unwrap();
        assert!((msi - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_msi_length_mismatch_fails_loudly() {
        let records = vec![record_at(0.0); 3];
        let com = vec![Point2::ORIGIN; 2];
        let err = movement_stability_index(&records, &com).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::DimensionMismatch {
                trajectories: 3,
                center_of_mass: 2
            }
        ));
    }

    #[test]
    fn test_dcr_single_limb_is_zero() {
        let mut record = JointRecord::undetected(17);
        record.set(5, Point2::new(100.0, 100.0));
        record.set(7, Point2::new(120.0, 140.0));
        assert_eq!(dynamic_coordination_ratio(&record, &[(5, 7)]), 0.0);
    }

    #[test]
    fn test_dcr_equal_limbs_is_zero_and_unequal_positive() {
        let record = JointRecord::from_xy(&[(10.0, 10.0), (13.0, 14.0), (16.0, 18.0)]);
        let equal = dynamic_coordination_ratio(&record, &[(0, 1), (1, 2)]);
        assert!(equal.abs() < 1e-12);

        let record = JointRecord::from_xy(&[(10.0, 10.0), (13.0, 14.0), (23.0, 14.0)]);
        // lengths 5 and 10: std 2.5, mean 7.5
        let ratio = dynamic_coordination_ratio(&record, &[(0, 1), (1, 2)]);
        assert!((ratio - 2.5 / (7.5 + DCR_EPSILON)).abs() < 1e-12);
    }
}
