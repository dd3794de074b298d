//! Spline-residual trajectory smoothness for a single joint.
use crate::analysis::derivatives::{derivative, DerivativeOrder};
use crate::analysis::spline::{SplineFit, MIN_SPLINE_POINTS};
use crate::analysis::stats;
use crate::core::Point2;
use serde::Serialize;

/// Smoothness of one joint's path over a window, with the two terms it combines.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrajectorySmoothness {
    /// Mean squared jerk magnitude of the raw path.
    pub msj: f64,
    /// Variance of the distance between the raw path and its smoothing-spline fit.
    pub var: f64,
    /// `1 / (1 + msj * var)`, in `(0, 1]`; higher is smoother.
    pub smoothness: f64,
}

/// Scores a joint path sampled at `fps`, fitting x(t) and y(t) with residual bound `s`.
///
/// Returns `None` when the path is too short for jerk or for the spline fit, or when the fit
/// cannot be computed.
pub fn trajectory_smoothness(path: &[Point2], fps: f64, s: f64) -> Option<TrajectorySmoothness> {
    if path.len() < MIN_SPLINE_POINTS.max(DerivativeOrder::Jerk.min_samples()) {
        return None;
    }
    let dt = 1.0 / fps;
    let jerk = derivative(path, DerivativeOrder::Jerk, dt)?;
    let jerk_sq: Vec<f64> = jerk.iter().map(Point2::norm_squared).collect();
    let msj = stats::mean(&jerk_sq)?;

    let t: Vec<f64> = (0..path.len()).map(|i| i as f64 * dt).collect();
    let xs: Vec<f64> = path.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = path.iter().map(|p| p.y).collect();
    let x_hat = SplineFit::fit(&t, &xs, s)?;
    let y_hat = SplineFit::fit(&t, &ys, s)?;

    let residuals: Vec<f64> = path
        .iter()
        .zip(x_hat.fitted.iter().zip(&y_hat.fitted))
        .map(|(p, (x, y))| (*p - Point2::new(*x, *y)).norm())
        .collect();
    let var = stats::variance(&residuals)?;

    let smoothness = 1.0 / (1.0 + msj * var);
    smoothness.is_finite().then_some(TrajectorySmoothness {
        msj,
        var,
        smoothness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_path_is_undefined() {
        let path = vec![Point2::new(1.0, 1.0); 3];
        assert!(trajectory_smoothness(&path, 30.0, 1e-3).is_none());
    }

    #[test]
    fn test_uniform_motion_is_perfectly_smooth() {
        let path: Vec<Point2> = (0..30)
            .map(|i| Point2::new(100.0 + 2.0 * i as f64, 50.0 + i as f64))
            .collect();
        let score = trajectory_smoothness(&path, 30.0, 1e-3).unwrap();
        assert!(score.msj < 1e-6);
        assert!((score.smoothness - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jittery_path_scores_lower() {
        let path: Vec<Point2> = (0..30)
            .map(|i| {
                let jitter = if i % 2 == 0 { 3.0 } else { -3.0 };
                Point2::new(100.0 + i as f64 + jitter, 80.0 - jitter)
            })
            .collect();
        let score = trajectory_smoothness(&path, 30.0, 50.0).unwrap();
        assert!(score.msj > 0.0);
        assert!(score.var > 0.0);
        assert!(score.smoothness > 0.0 && score.smoothness < 1.0);
    }
}
