//! Core traits and data types for the kinematic monitor.
use crate::analysis::jad::JadReport;
use crate::analysis::trajectory::TrajectorySmoothness;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Sub};

/// Number of keypoints in the COCO-17 layout produced by most 2D pose models.
pub const COCO_JOINT_COUNT: usize = 17;

/// A 2D image-space coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pose models report undetected joints at (or below) the origin.
    pub fn is_valid(&self) -> bool {
        self.x > 0.0 && self.y > 0.0
    }

    pub fn dot(&self, other: &Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<f64> for Point2 {
    type Output = Point2;

    fn div(self, rhs: f64) -> Point2 {
        Point2::new(self.x / rhs, self.y / rhs)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Point2::new(x, y)
    }
}

/// One detected body's keypoints for a single frame, in canonical joint order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointRecord {
    points: Vec<Point2>,
}

impl JointRecord {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// A record with every joint undetected.
    pub fn undetected(joint_count: usize) -> Self {
        Self::new(vec![Point2::ORIGIN; joint_count])
    }

    pub fn from_xy(pairs: &[(f64, f64)]) -> Self {
        Self::new(pairs.iter().copied().map(Point2::from).collect())
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Raw coordinate of a joint, detected or not.
    pub fn point(&self, joint: usize) -> Option<Point2> {
        self.points.get(joint).copied()
    }

    /// Coordinate of a joint only if the pose model detected it.
    pub fn valid_point(&self, joint: usize) -> Option<Point2> {
        self.point(joint).filter(Point2::is_valid)
    }

    pub fn set(&mut self, joint: usize, point: Point2) {
        if let Some(slot) = self.points.get_mut(joint) {
            *slot = point;
        }
    }
}

/// Per-frame snapshot of every metric the analyzer computed.
///
/// `None` always means "no value yet" (not enough buffered samples), never zero.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricReport {
    pub frame_index: u64,
    /// The tracked joint angle of this frame, in the configured unit.
    pub angle: Option<f64>,
    pub motion_smoothness: Option<f64>,
    pub msi: Option<f64>,
    pub dcr: f64,
    pub trajectory_smoothness: Option<TrajectorySmoothness>,
    pub jad: Option<JadReport>,
    /// Whether this frame fired a trigger event.
    pub triggered: bool,
}

/// An observation the trigger controller judged worth persisting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TriggerEvent {
    pub frame_index: u64,
    /// The keypoints of the triggering frame.
    pub record: JointRecord,
    /// Most recent buffered tracked angle.
    pub angle: Option<f64>,
    pub motion_smoothness: Option<f64>,
    pub msi: Option<f64>,
    pub detected_at: chrono::DateTime<chrono::Utc>,
}

/// Consumer of trigger events.
///
/// Called at most once per qualifying frame. The analyzer hands over ownership and does not
/// look at the outcome, so implementations deal with their own I/O failures.
pub trait TriggerSink: Send {
    fn on_trigger(&mut self, event: TriggerEvent);
}

impl<F> TriggerSink for F
where
    F: FnMut(TriggerEvent) + Send,
{
    fn on_trigger(&mut self, event: TriggerEvent) {
        self(event)
    }
}
