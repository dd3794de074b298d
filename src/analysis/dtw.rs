//! Dynamic time warping distance between two angle series.

/// DTW distance: square root of the smallest accumulated squared difference along any
/// monotone alignment of `a` and `b`. The series may differ in length and phase.
///
/// Returns `None` if either series is empty.
pub fn dtw_distance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    // Two rolling rows of the (|a|+1) x (|b|+1) cost matrix.
    let mut previous = vec![f64::INFINITY; b.len() + 1];
    let mut current = vec![f64::INFINITY; b.len() + 1];
    previous[0] = 0.0;

    for &x in a {
        current[0] = f64::INFINITY;
        for (j, &y) in b.iter().enumerate() {
            let cost = (x - y).powi(2);
            let best = previous[j].min(previous[j + 1]).min(current[j]);
            current[j + 1] = cost + best;
        }
        std::mem::swap(&mut previous, &mut current);
    }
    Some(previous[b.len()].sqrt())
}
