//! Small reusable validators for configuration values.
use std::ops::RangeInclusive;

/// Validates that a float is strictly positive and finite.
///
/// # Arguments
///
/// * `value` - The value to validate.
///
/// # Returns
///
/// * `Ok(())` if the value is positive and finite.
/// * `Err(&'static str)` otherwise, including for NaN.
pub fn is_positive_finite(value: f64) -> Result<(), &'static str> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err("must be positive and finite")
    }
}

/// Validates that a float is finite (thresholds may be zero or negative).
pub fn is_finite(value: f64) -> Result<(), &'static str> {
    if value.is_finite() {
        Ok(())
    } else {
        Err("must be finite")
    }
}

/// Validates that a count is non-zero.
pub fn is_nonzero(value: usize) -> Result<(), &'static str> {
    if value > 0 {
        Ok(())
    } else {
        Err("must be greater than 0")
    }
}

/// Validates that a joint index addresses a keypoint of a `joint_count`-joint skeleton.
pub fn is_valid_joint(index: usize, joint_count: usize) -> Result<(), &'static str> {
    if index < joint_count {
        Ok(())
    } else {
        Err("joint index is outside the skeleton")
    }
}

/// Validates that a joint chain does not reuse a joint.
pub fn is_distinct_chain(joints: &[usize]) -> Result<(), &'static str> {
    for (i, a) in joints.iter().enumerate() {
        if joints[i + 1..].contains(a) {
            return Err("joint chain repeats a joint");
        }
    }
    Ok(())
}

/// Validates if a given value is within a specified numeric range.
///
/// # Arguments
///
/// * `value` - The value to validate.
/// * `range` - The inclusive range to validate against.
pub fn is_in_range<T: PartialOrd>(value: T, range: RangeInclusive<T>) -> Result<(), &'static str> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err("Value is outside the specified range")
    }
}

/// Validates if a given string is not empty.
pub fn is_not_empty(value: &str) -> Result<(), &'static str> {
    if !value.trim().is_empty() {
        Ok(())
    } else {
        Err("Value cannot be empty")
    }
}
