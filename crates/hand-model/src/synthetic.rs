//! Synthetic hand geometry for tests and simulation.
//!
//! Builds an upright hand (fingers pointing toward smaller y) anchored at
//! the wrist. All offsets are expressed in multiples of the hand scale, the
//! wrist-to-middle-knuckle distance, so `scale` is exactly the hand scale
//! the normalizer will measure on a square frame.

use crate::frame::DetectedHand;
use crate::landmark::{Finger, Joint, JointSet, Point3};

/// Knuckle offsets from the wrist, in hand-scale units.
const KNUCKLES: [(Finger, f64, f64); 4] = [
    (Finger::Index, -0.25, -0.95),
    (Finger::Middle, 0.0, -1.0),
    (Finger::Ring, 0.22, -0.95),
    (Finger::Pinky, 0.42, -0.85),
];

/// PIP, DIP, and tip offsets from the knuckle for a straight finger.
const EXTENDED_CHAIN: [(f64, f64); 3] = [(0.0, -0.35), (0.0, -0.6), (0.0, -0.8)];

/// PIP, DIP, and tip offsets from the knuckle for a finger curled into the palm.
const FOLDED_CHAIN: [(f64, f64); 3] = [(0.0, -0.3), (0.0, -0.05), (0.0, 0.1)];

/// Thumb CMC, MCP, IP, and tip offsets from the wrist, resting away from the fingers.
const THUMB_REST: [(f64, f64); 4] = [(-0.3, -0.2), (-0.5, -0.4), (-0.6, -0.55), (-0.7, -0.7)];

/// Canonical synthetic hand shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntheticPose {
    /// Every finger extended.
    OpenPalm,
    /// Every finger curled.
    Fist,
    /// Index extended, the rest curled.
    Point,
    /// Index and middle extended in a V, ring and pinky curled.
    TwoFinger,
    /// Index extended with the thumb tip `ratio` hand scales to its right.
    PinchIndex { ratio: f64 },
    /// Middle extended with the thumb tip `ratio` hand scales to its right.
    PinchMiddle { ratio: f64 },
}

/// Builder for a synthetic [`DetectedHand`].
#[derive(Debug, Clone)]
pub struct HandBuilder {
    wrist: (f64, f64),
    scale: f64,
    pose: SyntheticPose,
    confidence: f32,
    overrides: Vec<(Joint, Point3)>,
}

impl HandBuilder {
    /// Hand with its wrist at `(wrist_x, wrist_y)` and the given hand scale,
    /// in the [`SyntheticPose::Point`] pose.
    pub fn new(wrist_x: f64, wrist_y: f64, scale: f64) -> Self {
        Self {
            wrist: (wrist_x, wrist_y),
            scale,
            pose: SyntheticPose::Point,
            confidence: 0.95,
            overrides: Vec::new(),
        }
    }

    pub fn pose(mut self, pose: SyntheticPose) -> Self {
        self.pose = pose;
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Shift the whole hand, including any overridden joints.
    pub fn translate(mut self, dx: f64, dy: f64) -> Self {
        self.wrist = (self.wrist.0 + dx, self.wrist.1 + dy);
        for (_, point) in &mut self.overrides {
            point.x += dx;
            point.y += dy;
        }
        self
    }

    /// Force a joint to an absolute position after the pose is laid out.
    pub fn with_joint(mut self, joint: Joint, point: Point3) -> Self {
        self.overrides.push((joint, point));
        self
    }

    /// Absolute image-space position of a joint offset, in scale units.
    fn at(&self, dx: f64, dy: f64) -> Point3 {
        Point3::new(
            self.wrist.0 + dx * self.scale,
            self.wrist.1 + dy * self.scale,
            0.0,
        )
    }

    pub fn joints(&self) -> JointSet {
        let mut joints = JointSet::default();
        joints.set(Joint::Wrist, self.at(0.0, 0.0));

        for (finger, kx, ky) in KNUCKLES {
            let chain = if self.extended(finger) {
                EXTENDED_CHAIN
            } else {
                FOLDED_CHAIN
            };
            let [base, pip, dip, tip] = finger.joints();
            joints.set(base, self.at(kx, ky));
            for (joint, (dx, dy)) in [pip, dip, tip].into_iter().zip(chain) {
                joints.set(joint, self.at(kx + dx, ky + dy));
            }
        }

        for (joint, (dx, dy)) in Finger::Thumb.joints().into_iter().zip(THUMB_REST) {
            joints.set(joint, self.at(dx, dy));
        }

        let pinch = match self.pose {
            SyntheticPose::PinchIndex { ratio } => Some((Finger::Index, ratio)),
            SyntheticPose::PinchMiddle { ratio } => Some((Finger::Middle, ratio)),
            _ => None,
        };
        if let Some((finger, ratio)) = pinch {
            let target = joints.get(finger.tip());
            joints.set(
                Joint::ThumbTip,
                Point3::new(target.x + ratio * self.scale, target.y, target.z),
            );
        }

        for (joint, point) in &self.overrides {
            joints.set(*joint, *point);
        }
        joints
    }

    pub fn build(&self) -> DetectedHand {
        DetectedHand::new(self.joints(), self.confidence)
    }

    fn extended(&self, finger: Finger) -> bool {
        match self.pose {
            SyntheticPose::OpenPalm => true,
            SyntheticPose::Fist => false,
            SyntheticPose::Point | SyntheticPose::PinchIndex { .. } => finger == Finger::Index,
            SyntheticPose::TwoFinger => matches!(finger, Finger::Index | Finger::Middle),
            SyntheticPose::PinchMiddle { .. } => finger == Finger::Middle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_wrist_to_middle_knuckle() {
        let joints = HandBuilder::new(0.5, 0.8, 0.2).joints();
        assert!((joints.distance(Joint::Wrist, Joint::MiddleMcp) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_places_thumb_at_ratio() {
        let joints = HandBuilder::new(0.5, 0.8, 0.2)
            .pose(SyntheticPose::PinchIndex { ratio: 0.04 })
            .joints();
        let d = joints.distance(Joint::ThumbTip, Joint::IndexTip);
        assert!((d - 0.008).abs() < 1e-12);
    }

    #[test]
    fn test_translate_moves_everything() {
        let base = HandBuilder::new(0.5, 0.8, 0.2).pose(SyntheticPose::TwoFinger);
        let moved = base.clone().translate(0.0, -0.1).joints();
        let base = base.joints();
        for joint in Joint::ALL {
            assert!((base.get(joint).y - 0.1 - moved.get(joint).y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_extended_tip_is_above_folded_tip() {
        let joints = HandBuilder::new(0.5, 0.8, 0.2).joints();
        assert!(joints.get(Joint::IndexTip).y < joints.get(Joint::IndexPip).y);
        assert!(joints.get(Joint::MiddleTip).y > joints.get(Joint::MiddlePip).y);
    }
}
