//! PCA coordination index across joint-angle series.
//!
//! The series are stacked as a `time x joints` matrix, centered per joint, and the explained
//! variance ratios come from the eigenvalues of the joint covariance matrix. The index is
//! `1 / k` for the smallest `k` whose cumulative ratio reaches [`VARIANCE_TARGET`]. An index of
//! `1.0` means one component explains the motion (fully coordinated); more independent
//! components push it toward zero.

use crate::analysis::stats;
use nalgebra::{DMatrix, SymmetricEigen};

/// Cumulative explained variance the leading components must reach.
pub const VARIANCE_TARGET: f64 = 0.9;

// Absorbs rounding in cumulative sums that should land exactly on the target.
const RATIO_TOLERANCE: f64 = 1e-12;

/// Explained variance ratio of each principal component, largest first.
///
/// `series` holds one equally long time series per joint. At most `min(time, joints)`
/// components are reported. Returns `None` for no joints, fewer than two samples, unequal
/// lengths, non-finite values, or zero total variance.
pub fn explained_variance_ratio(series: &[Vec<f64>]) -> Option<Vec<f64>> {
    let joints = series.len();
    let samples = series.first()?.len();
    if samples < 2 || series.iter().any(|s| s.len() != samples) {
        return None;
    }
    if series.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }

    let means = series
        .iter()
        .map(|s| stats::mean(s))
        .collect::<Option<Vec<f64>>>()?;
    let data = DMatrix::from_fn(samples, joints, |t, j| series[j][t] - means[j]);
    let covariance = (data.transpose() * &data) / (samples as f64 - 1.0);

    let mut eigenvalues: Vec<f64> = SymmetricEigen::new(covariance)
        .eigenvalues
        .iter()
        .map(|v| v.max(0.0))
        .collect();
    let total: f64 = eigenvalues.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    eigenvalues.sort_by(|a, b| b.total_cmp(a));
    eigenvalues.truncate(samples.min(joints));
    Some(eigenvalues.into_iter().map(|v| v / total).collect())
}

/// Smallest number of components whose cumulative ratio reaches `target`.
pub fn components_for(ratios: &[f64], target: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, ratio) in ratios.iter().enumerate() {
        cumulative += ratio;
        if cumulative + RATIO_TOLERANCE >= target {
            return i + 1;
        }
    }
    ratios.len().max(1)
}

/// Coordination index in `(0, 1]`.
///
/// Series without any variance move in perfect lockstep (trivially) and score `1.0`.
/// Returns `None` only when the input cannot form a matrix: no joints, fewer than two samples,
/// unequal lengths or non-finite values.
pub fn coordination_index(series: &[Vec<f64>]) -> Option<f64> {
    let samples = series.first()?.len();
    if samples < 2 || series.iter().any(|s| s.len() != samples) {
        return None;
    }
    if series.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    let k = match explained_variance_ratio(series) {
        Some(ratios) => components_for(&ratios, VARIANCE_TARGET),
        None => 1,
    };
    Some(1.0 / k as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(phase: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.4 + phase).sin()).collect()
    }

    #[test]
    fn test_identical_series_fully_coordinated() {
        let base = wave(0.0, 30);
        let series = vec![base.clone(), base.clone(), base];
        assert_eq!(coordination_index(&series), Some(1.0));
    }

    #[test]
    fn test_scaled_series_fully_coordinated() {
        let base = wave(0.0, 30);
        let scaled: Vec<f64> = base.iter().map(|v| 2.0 * v + 1.0).collect();
        assert_eq!(coordination_index(&[base, scaled]), Some(1.0));
    }

    #[test]
    fn test_independent_series_less_coordinated() {
        let n = 40;
        let a: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let b: Vec<f64> = (0..n).map(|i| (i as f64 * 1.7).cos()).collect();
        let c: Vec<f64> = (0..n).map(|i| if i % 3 == 0 { 1.0 } else { -0.5 }).collect();
        let index = coordination_index(&[a, b, c]).unwrap();
        assert!(index < 1.0);
        assert!(index > 0.0);
    }

    #[test]
    fn test_ratios_sum_to_one() {
        let ratios = explained_variance_ratio(&[wave(0.0, 25), wave(1.0, 25), wave(2.5, 25)])
            .unwrap();
        let total: f64 = ratios.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(ratios.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_constant_series_index_is_one() {
        assert_eq!(coordination_index(&[vec![1.0; 10], vec![2.0; 10]]), Some(1.0));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(coordination_index(&[]), None);
        assert_eq!(coordination_index(&[vec![1.0]]), None);
        assert_eq!(coordination_index(&[vec![1.0, 2.0], vec![1.0]]), None);
    }

    #[test]
    fn test_components_for_target() {
        assert_eq!(components_for(&[0.6, 0.25, 0.15], 0.9), 3);
        assert_eq!(components_for(&[0.6, 0.3, 0.1], 0.9), 2);
        assert_eq!(components_for(&[1.0], 0.9), 1);
    }
}
