//! Natural cubic smoothing spline with a residual bound.
//!
//! The fit is the smoothest natural cubic spline `g` whose residual sum of squares
//! `sum (y_i - g(t_i))^2` does not exceed the smoothing factor `s` (Reinsch's formulation).
//! A bound of zero interpolates the data; a bound at least as large as the residual of the
//! least-squares line returns that line.
//!
//! For a penalty weight `lambda` the fitted values are `y - lambda * Q * gamma`, where
//! `(R + lambda * Q^T Q) gamma = Q^T y` with `Q` and `R` the banded second-difference and
//! spline-integral matrices of the knot spacing. The residual grows monotonically with
//! `lambda`, so the largest feasible `lambda` is found by bisection in log space.

use nalgebra::{DMatrix, DVector};

/// Fewest samples a cubic spline fit accepts.
pub const MIN_SPLINE_POINTS: usize = 4;

const LAMBDA_FLOOR: f64 = 1e-30;
const LAMBDA_CEIL: f64 = 1e30;
const BISECTION_STEPS: usize = 64;

/// Fitted values of a smoothing spline at its sample times.
#[derive(Clone, Debug, PartialEq)]
pub struct SplineFit {
    /// Penalty weight of the chosen fit; infinite for the least-squares line.
    pub lambda: f64,
    pub fitted: Vec<f64>,
    pub residual_sum_squares: f64,
}

impl SplineFit {
    /// Fits `y(t)` under residual bound `s`.
    ///
    /// Returns `None` for fewer than [`MIN_SPLINE_POINTS`] samples, mismatched lengths,
    /// non-increasing times, non-finite input, or a numerically singular system.
    pub fn fit(t: &[f64], y: &[f64], s: f64) -> Option<Self> {
        let n = t.len();
        if n < MIN_SPLINE_POINTS || y.len() != n || s.is_nan() || s < 0.0 {
            return None;
        }
        if t.iter().chain(y).any(|v| !v.is_finite()) {
            return None;
        }
        let h: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|&step| step <= 0.0) {
            return None;
        }

        if s == 0.0 {
            return Some(Self::interpolant(y));
        }

        let line = least_squares_line(t, y)?;
        if line.residual_sum_squares <= s {
            return Some(line);
        }

        let system = PenalizedSystem::new(&h, y);
        // A system too ill-conditioned to factor counts as infeasible.
        let feasible = |lambda: f64| {
            system
                .solve(lambda)
                .is_some_and(|fit| fit.residual_sum_squares <= s)
        };

        // Bracket the bound between a feasible `lo` and an infeasible `hi`.
        let mut lo;
        let mut hi;
        if feasible(1.0) {
            lo = 1.0;
            while lo < LAMBDA_CEIL && feasible(lo * 10.0) {
                lo *= 10.0;
            }
            hi = lo * 10.0;
        } else {
            hi = 1.0;
            while hi > LAMBDA_FLOOR && !feasible(hi / 10.0) {
                hi /= 10.0;
            }
            lo = hi / 10.0;
        }
        if !feasible(lo) {
            return Some(Self::interpolant(y));
        }

        for _ in 0..BISECTION_STEPS {
            let mid = (lo * hi).sqrt();
            if feasible(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        system.solve(lo)
    }

    fn interpolant(y: &[f64]) -> Self {
        Self {
            lambda: 0.0,
            fitted: y.to_vec(),
            residual_sum_squares: 0.0,
        }
    }
}

struct PenalizedSystem {
    q: DMatrix<f64>,
    r: DMatrix<f64>,
    qtq: DMatrix<f64>,
    qty: DVector<f64>,
    y: DVector<f64>,
}

impl PenalizedSystem {
    fn new(h: &[f64], y: &[f64]) -> Self {
        let n = y.len();
        let m = n - 2;
        let mut q = DMatrix::zeros(n, m);
        let mut r = DMatrix::zeros(m, m);
        for j in 0..m {
            q[(j, j)] = 1.0 / h[j];
            q[(j + 1, j)] = -1.0 / h[j] - 1.0 / h[j + 1];
            q[(j + 2, j)] = 1.0 / h[j + 1];
            r[(j, j)] = (h[j] + h[j + 1]) / 3.0;
            if j + 1 < m {
                r[(j, j + 1)] = h[j + 1] / 6.0;
                r[(j + 1, j)] = h[j + 1] / 6.0;
            }
        }
        let y = DVector::from_column_slice(y);
        let qt = q.transpose();
        let qtq = &qt * &q;
        let qty = &qt * &y;
        Self { q, r, qtq, qty, y }
    }

    fn solve(&self, lambda: f64) -> Option<SplineFit> {
        let system = &self.r + &self.qtq * lambda;
        let gamma = system.cholesky()?.solve(&self.qty);
        let correction = &self.q * gamma * lambda;
        let residual_sum_squares = correction.norm_squared();
        if !residual_sum_squares.is_finite() {
            return None;
        }
        Some(SplineFit {
            lambda,
            fitted: (&self.y - correction).iter().copied().collect(),
            residual_sum_squares,
        })
    }
}

fn least_squares_line(t: &[f64], y: &[f64]) -> Option<SplineFit> {
    let n = t.len() as f64;
    let t_mean = t.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;
    let (mut cov, mut var) = (0.0, 0.0);
    for (ti, yi) in t.iter().zip(y) {
        cov += (ti - t_mean) * (yi - y_mean);
        var += (ti - t_mean).powi(2);
    }
    if var <= 0.0 {
        return None;
    }
    let slope = cov / var;
    let fitted: Vec<f64> = t.iter().map(|ti| y_mean + slope * (ti - t_mean)).collect();
    let residual_sum_squares = y.iter().zip(&fitted).map(|(a, b)| (a - b).powi(2)).sum();
    Some(SplineFit {
        lambda: f64::INFINITY,
        fitted,
        residual_sum_squares,
    })
}
