//! Per-frame skeleton geometry: limb vectors, joint angles and the center of mass.
//!
//! Undetected joints (see [`Point2::is_valid`]) never take part in a limb vector or an angle.
//! The center of mass is the exception: by default it averages every joint, detected or not,
//! which pulls it toward the origin on partial detections. `valid_only` opts out of that.

use crate::core::{JointRecord, Point2};
use serde::{Deserialize, Serialize};

/// A limb as `(start_joint, end_joint)`.
pub type Connection = (usize, usize);

/// The COCO-17 skeleton graph.
pub const COCO_SKELETON: [Connection; 17] = [
    (0, 1),
    (0, 2),
    (1, 3),
    (2, 4),
    (0, 5),
    (0, 6),
    (5, 7),
    (7, 9),
    (6, 8),
    (8, 10),
    (5, 11),
    (6, 12),
    (11, 13),
    (13, 15),
    (12, 14),
    (14, 16),
    (11, 12),
];

/// Three joints forming a `prev - curr - next` chain; the angle is measured at `curr`.
///
/// Serialized as a `[prev, curr, next]` array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct JointTriple {
    pub prev: usize,
    pub curr: usize,
    pub next: usize,
}

impl JointTriple {
    pub const fn new(prev: usize, curr: usize, next: usize) -> Self {
        Self { prev, curr, next }
    }

    pub fn joints(&self) -> [usize; 3] {
        [self.prev, self.curr, self.next]
    }
}

impl From<[usize; 3]> for JointTriple {
    fn from([prev, curr, next]: [usize; 3]) -> Self {
        Self::new(prev, curr, next)
    }
}

impl From<JointTriple> for [usize; 3] {
    fn from(triple: JointTriple) -> Self {
        triple.joints()
    }
}

/// Unit of reported angle values.
///
/// Degrees by default, the unit the smoothness threshold is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Radians,
    #[default]
    Degrees,
}

impl AngleUnit {
    /// Expresses an angle given in radians in this unit.
    pub fn convert(self, radians: f64) -> f64 {
        match self {
            AngleUnit::Radians => radians,
            AngleUnit::Degrees => radians.to_degrees(),
        }
    }
}

/// `end - start` for a limb whose endpoints were both detected.
pub fn limb_vector(record: &JointRecord, (start, end): Connection) -> Option<Point2> {
    Some(record.valid_point(end)? - record.valid_point(start)?)
}

/// Euclidean lengths of every limb of `connections` that is fully detected, in graph order.
pub fn limb_lengths(record: &JointRecord, connections: &[Connection]) -> Vec<f64> {
    connections
        .iter()
        .filter_map(|&connection| limb_vector(record, connection))
        .map(|limb| limb.norm())
        .collect()
}

/// Angle at `curr` between the vectors to `prev` and `next`, in `[0, pi]` radians.
///
/// A zero-length vector has no direction, so the angle is `None` rather than NaN. The cosine is
/// clamped to `[-1, 1]` against rounding just outside the domain of `acos`.
pub fn joint_angle(prev: Point2, curr: Point2, next: Point2) -> Option<f64> {
    let v1 = prev - curr;
    let v2 = next - curr;
    let norms = v1.norm() * v2.norm();
    if !norms.is_finite() || norms <= 0.0 {
        return None;
    }
    let cos_theta = (v1.dot(&v2) / norms).clamp(-1.0, 1.0);
    Some(cos_theta.acos())
}

/// Angle of a joint chain in one frame; `None` if any of its joints is undetected.
pub fn record_angle(record: &JointRecord, triple: JointTriple) -> Option<f64> {
    joint_angle(
        record.valid_point(triple.prev)?,
        record.valid_point(triple.curr)?,
        record.valid_point(triple.next)?,
    )
}

/// Mean keypoint position of a record; `None` for an empty record.
///
/// With `valid_only` set, undetected joints are left out. A frame with no detected joint then
/// falls back to the plain mean so the center-of-mass window keeps one entry per frame.
pub fn center_of_mass(record: &JointRecord, valid_only: bool) -> Option<Point2> {
    if valid_only {
        if let Some(com) = mean_point(record.points().iter().filter(|p| p.is_valid())) {
            return Some(com);
        }
    }
    mean_point(record.points().iter())
}

fn mean_point<'a>(points: impl Iterator<Item = &'a Point2>) -> Option<Point2> {
    let (sum, count) = points.fold((Point2::ORIGIN, 0usize), |(sum, count), p| {
        (sum + *p, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}
