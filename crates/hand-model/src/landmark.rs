//! Hand joint naming and the fixed-size joint set.
//!
//! Joint order follows the 21-point hand topology used by common pose
//! sources: the wrist, then four joints per digit from base to tip.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;

/// Number of joints in a hand.
pub const JOINT_COUNT: usize = 21;

/// Anatomical joint identifier. The discriminant is the joint's index in a
/// [`JointSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl Joint {
    /// All joints in index order.
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Wrist,
        Joint::ThumbCmc,
        Joint::ThumbMcp,
        Joint::ThumbIp,
        Joint::ThumbTip,
        Joint::IndexMcp,
        Joint::IndexPip,
        Joint::IndexDip,
        Joint::IndexTip,
        Joint::MiddleMcp,
        Joint::MiddlePip,
        Joint::MiddleDip,
        Joint::MiddleTip,
        Joint::RingMcp,
        Joint::RingPip,
        Joint::RingDip,
        Joint::RingTip,
        Joint::PinkyMcp,
        Joint::PinkyPip,
        Joint::PinkyDip,
        Joint::PinkyTip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A digit of the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// The four non-thumb fingers.
    pub const FINGERS: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Joints of this digit from base to tip.
    pub fn joints(self) -> [Joint; 4] {
        let base = match self {
            Finger::Thumb => Joint::ThumbCmc,
            Finger::Index => Joint::IndexMcp,
            Finger::Middle => Joint::MiddleMcp,
            Finger::Ring => Joint::RingMcp,
            Finger::Pinky => Joint::PinkyMcp,
        }
        .index();
        [
            Joint::ALL[base],
            Joint::ALL[base + 1],
            Joint::ALL[base + 2],
            Joint::ALL[base + 3],
        ]
    }

    /// Knuckle where the digit meets the palm (CMC for the thumb).
    pub fn base(self) -> Joint {
        self.joints()[0]
    }

    /// Second joint from the palm.
    pub fn pip(self) -> Joint {
        self.joints()[1]
    }

    pub fn tip(self) -> Joint {
        self.joints()[3]
    }
}

/// A 3D joint position. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    pub fn sub(&self, other: &Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
        Point3::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5, (a.z + b.z) * 0.5)
    }

    /// Projection onto the image plane.
    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// The 21 joints of one hand, indexed by [`Joint`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3>", into = "Vec<Point3>")]
pub struct JointSet([Point3; JOINT_COUNT]);

/// Wrong number of joints for a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected 21 joints, got {0}")]
pub struct JointCountError(pub usize);

impl TryFrom<Vec<Point3>> for JointSet {
    type Error = JointCountError;

    fn try_from(points: Vec<Point3>) -> Result<Self, Self::Error> {
        Self::from_slice(&points)
    }
}

impl From<JointSet> for Vec<Point3> {
    fn from(set: JointSet) -> Self {
        set.0.to_vec()
    }
}

impl JointSet {
    pub fn new(points: [Point3; JOINT_COUNT]) -> Self {
        Self(points)
    }

    /// Build from a slice, which must hold exactly [`JOINT_COUNT`] points.
    pub fn from_slice(points: &[Point3]) -> Result<Self, JointCountError> {
        let points: [Point3; JOINT_COUNT] = points
            .try_into()
            .map_err(|_| JointCountError(points.len()))?;
        Ok(Self(points))
    }

    pub fn get(&self, joint: Joint) -> Point3 {
        self.0[joint.index()]
    }

    pub fn set(&mut self, joint: Joint, point: Point3) {
        self.0[joint.index()] = point;
    }

    pub fn distance(&self, a: Joint, b: Joint) -> f64 {
        self.get(a).distance_to(&self.get(b))
    }

    pub fn points(&self) -> &[Point3; JOINT_COUNT] {
        &self.0
    }

    /// Apply `f` to every joint.
    pub fn map(&self, f: impl Fn(Point3) -> Point3) -> JointSet {
        JointSet(self.0.map(f))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(Point3::is_finite)
    }
}

impl Index<Joint> for JointSet {
    type Output = Point3;

    fn index(&self, joint: Joint) -> &Point3 {
        &self.0[joint.index()]
    }
}

impl Default for JointSet {
    fn default() -> Self {
        Self([Point3::default(); JOINT_COUNT])
    }
}
