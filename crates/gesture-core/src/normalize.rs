//! Landmark normalization.
//!
//! The pose source normalizes x against frame width and y against frame
//! height, so on a non-square frame a unit of x and a unit of y cover
//! different physical distances. Normalization rescales both axes against
//! the longer frame edge, making Euclidean distances isotropic, and measures
//! the hand scale (wrist to middle-finger knuckle) that every threshold is
//! expressed in.

use gesturemouse_common::error::{GestureError, GestureResult};
use gesturemouse_hand_model::geometry::Point2D;
use gesturemouse_hand_model::landmark::{Joint, JointSet, Point3};

/// Hand scales below this are treated as coincident joints.
pub const MIN_HAND_SCALE: f64 = 1e-6;

/// The index/middle fingertip midpoint in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMidpoint {
    /// `[0, 1]` image space. Scroll units are measured here.
    pub image: Point2D,
    /// Aspect-corrected space, in the units of the hand scale.
    pub metric: Point2D,
}

/// A hand ready for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHand {
    /// Joints in `[0, 1]` image space, mirrored if requested. Used for the
    /// pointer anchor.
    image: JointSet,

    /// Aspect-corrected joints. Used for every distance measurement.
    metric: JointSet,

    scale: f64,
}

/// Normalize one hand.
///
/// `aspect_ratio` is frame width / height; non-finite or non-positive values
/// are treated as square. Fails with `DegenerateHand` when the wrist and the
/// middle-finger knuckle coincide or any joint is not finite.
pub fn normalize(
    joints: &JointSet,
    aspect_ratio: f64,
    mirror: bool,
) -> GestureResult<NormalizedHand> {
    if !joints.is_finite() {
        return Err(GestureError::degenerate_hand(f64::NAN));
    }

    let image = if mirror {
        joints.map(|p| Point3::new(1.0 - p.x, p.y, p.z))
    } else {
        *joints
    };

    let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };
    // Depth shares the x axis's scale in pose-source output.
    let metric = if aspect >= 1.0 {
        image.map(|p| Point3::new(p.x, p.y / aspect, p.z))
    } else {
        image.map(|p| Point3::new(p.x * aspect, p.y, p.z * aspect))
    };

    let scale = metric.distance(Joint::Wrist, Joint::MiddleMcp);
    if scale < MIN_HAND_SCALE {
        return Err(GestureError::degenerate_hand(scale));
    }

    Ok(NormalizedHand {
        image,
        metric,
        scale,
    })
}

impl NormalizedHand {
    /// Wrist-to-middle-knuckle distance in metric space. Always positive.
    pub fn hand_scale(&self) -> f64 {
        self.scale
    }

    pub fn image(&self) -> &JointSet {
        &self.image
    }

    pub fn metric(&self) -> &JointSet {
        &self.metric
    }

    /// Metric distance between two joints.
    pub fn distance(&self, a: Joint, b: Joint) -> f64 {
        self.metric.distance(a, b)
    }

    /// Metric distance between two joints in hand-scale units.
    pub fn scaled_distance(&self, a: Joint, b: Joint) -> f64 {
        self.distance(a, b) / self.scale
    }

    /// Pointer anchor: the index fingertip in image space.
    pub fn pointer_anchor(&self) -> Point2D {
        self.image.get(Joint::IndexTip).xy()
    }

    /// Midpoint of the index and middle fingertips.
    pub fn scroll_midpoint(&self) -> ScrollMidpoint {
        let midpoint = |joints: &JointSet| {
            Point3::midpoint(&joints.get(Joint::IndexTip), &joints.get(Joint::MiddleTip)).xy()
        };
        ScrollMidpoint {
            image: midpoint(&self.image),
            metric: midpoint(&self.metric),
        }
    }
}
