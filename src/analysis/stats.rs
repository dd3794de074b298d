//! Population statistics over slices.

/// Arithmetic mean, accumulated relative to the first sample so that a constant series
/// centers to exactly zero.
pub fn mean(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    let offset = values.iter().map(|v| v - first).sum::<f64>() / values.len() as f64;
    Some(first + offset)
}

/// Population variance (`ddof = 0`).
pub fn variance(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    Some(values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (`ddof = 0`).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_moments() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(variance(&values), Some(4.0));
        assert_eq!(std_dev(&values), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_constant_series_has_exactly_zero_spread() {
        let values = [2.3; 10];
        assert_eq!(mean(&values), Some(2.3));
        assert_eq!(variance(&values), Some(0.0));
    }
}
