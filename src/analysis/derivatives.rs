//! Finite-difference kinematics over uniformly sampled series.
//!
//! Every order is a forward first difference of the order below it, so order `k` needs at
//! least `k + 1` samples and yields `n - k` values. Asking for more than the series supports
//! returns `None`; a shortened or padded array is never produced.

use crate::core::Point2;
use std::ops::{Div, Sub};

/// A sample type that can be differenced: scalar angles or 2D positions.
pub trait Sample: Copy + Sub<Output = Self> + Div<f64, Output = Self> {}

impl Sample for f64 {}
impl Sample for Point2 {}

/// Derivative orders with a kinematic name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DerivativeOrder {
    Velocity = 1,
    Acceleration = 2,
    Jerk = 3,
}

impl DerivativeOrder {
    pub fn order(self) -> usize {
        self as usize
    }

    /// Smallest series length for which this order is defined.
    pub fn min_samples(self) -> usize {
        self.order() + 1
    }
}

/// `order`-th difference without time scaling (`numpy.diff(series, n=order)`).
pub fn finite_difference<T: Sample>(series: &[T], order: usize) -> Option<Vec<T>> {
    if series.len() <= order {
        return None;
    }
    let mut current = series.to_vec();
    for _ in 0..order {
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Some(current)
}

/// `order`-th time derivative with sample interval `dt`.
pub fn derivative<T: Sample>(series: &[T], order: DerivativeOrder, dt: f64) -> Option<Vec<T>> {
    if series.len() < order.min_samples() {
        return None;
    }
    let mut current = series.to_vec();
    for _ in 0..order.order() {
        current = current.windows(2).map(|w| (w[1] - w[0]) / dt).collect();
    }
    Some(current)
}

/// Velocity, acceleration and jerk of one series.
#[derive(Clone, Debug, PartialEq)]
pub struct Dynamics<T> {
    pub velocity: Vec<T>,
    pub acceleration: Vec<T>,
    pub jerk: Vec<T>,
}

impl<T: Sample> Dynamics<T> {
    /// All three orders at once; needs at least four samples.
    pub fn compute(series: &[T], dt: f64) -> Option<Self> {
        let velocity = derivative(series, DerivativeOrder::Velocity, dt)?;
        let acceleration = derivative(&velocity, DerivativeOrder::Velocity, dt)?;
        let jerk = derivative(&acceleration, DerivativeOrder::Velocity, dt)?;
        Some(Self {
            velocity,
            acceleration,
            jerk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_need_increasing_lengths() {
        let series = [0.0, 1.0, 4.0];
        assert!(derivative(&series, DerivativeOrder::Velocity, 1.0).is_some());
        assert!(derivative(&series, DerivativeOrder::Acceleration, 1.0).is_some());
        assert!(derivative(&series, DerivativeOrder::Jerk, 1.0).is_none());
        assert!(Dynamics::compute(&series, 1.0).is_none());
    }

    #[test]
    fn test_cubic_has_constant_jerk() {
        let dt = 0.5;
        let series: Vec<f64> = (0..6).map(|i| (i as f64 * dt).powi(3)).collect();
        let dynamics = Dynamics::compute(&series, dt).unwrap();
        assert_eq!(dynamics.velocity.len(), 5);
        assert_eq!(dynamics.acceleration.len(), 4);
        assert_eq!(dynamics.jerk.len(), 3);
        for jerk in dynamics.jerk {
            assert!((jerk - 6.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_raw_difference_ignores_dt() {
        let diff = finite_difference(&[1.0, 2.0, 4.0, 8.0], 3).unwrap();
        assert_eq!(diff, vec![1.0]);
        assert!(finite_difference(&[1.0, 2.0, 4.0], 3).is_none());
    }

    #[test]
    fn test_point_velocity() {
        let points = [Point2::new(1.0, 1.0), Point2::new(2.0, 3.0)];
        let velocity = derivative(&points, DerivativeOrder::Velocity, 0.5).unwrap();
        assert_eq!(velocity, vec![Point2::new(2.0, 4.0)]);
    }
}
