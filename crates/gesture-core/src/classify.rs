//! Per-frame pose classification.
//!
//! Stateless and deterministic: the label depends only on the current
//! frame's joints, hand scale, confidence, and config. Labels are tried in a
//! fixed order and the first match wins:
//!
//! `PinchPrimary > PinchSecondary > TwoFinger > Point > None`

use serde::{Deserialize, Serialize};

use gesturemouse_common::config::GestureConfig;
use gesturemouse_hand_model::landmark::{Finger, Joint, Point3};

use crate::normalize::NormalizedHand;

/// A finger counts as extended when its tip projects further than this many
/// hand scales along the knuckle-to-PIP axis.
pub const EXTENDED_FRACTION: f64 = 0.5;

/// Minimum horizontal fingertip spread, in hand scales, for `TwoFinger`.
pub const TWO_FINGER_MIN_SPREAD: f64 = 0.15;

/// Canonical hand pose for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLabel {
    #[default]
    None,
    /// Index extended, other fingers folded. Drives the pointer.
    Point,
    /// Thumb tip touching the index tip. Left button.
    PinchPrimary,
    /// Thumb tip touching the middle tip. Right button.
    PinchSecondary,
    /// Index and middle extended and spread. Scrolls.
    TwoFinger,
}

impl PoseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Point => "point",
            Self::PinchPrimary => "pinch-primary",
            Self::PinchSecondary => "pinch-secondary",
            Self::TwoFinger => "two-finger",
        }
    }
}

/// Shape of one non-thumb finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerState {
    Extended,
    Folded,
    /// Neither clearly extended nor curled into the palm.
    Partial,
}

/// Classify one frame.
pub fn classify(hand: &NormalizedHand, confidence: f32, config: &GestureConfig) -> PoseLabel {
    if confidence.is_nan() || confidence < config.detection_confidence_min {
        return PoseLabel::None;
    }

    if hand.scaled_distance(Joint::ThumbTip, Joint::IndexTip) < config.pinch_threshold {
        return PoseLabel::PinchPrimary;
    }
    if hand.scaled_distance(Joint::ThumbTip, Joint::MiddleTip) < config.pinch_threshold {
        return PoseLabel::PinchSecondary;
    }

    let [index, middle, ring, pinky] = finger_states(hand);
    let rest_folded = ring == FingerState::Folded && pinky == FingerState::Folded;

    if index == FingerState::Extended && middle == FingerState::Extended && rest_folded {
        let spread = (hand.metric().get(Joint::IndexTip).x - hand.metric().get(Joint::MiddleTip).x)
            .abs()
            / hand.hand_scale();
        if spread >= TWO_FINGER_MIN_SPREAD {
            return PoseLabel::TwoFinger;
        }
    }

    if index == FingerState::Extended && middle == FingerState::Folded && rest_folded {
        return PoseLabel::Point;
    }

    PoseLabel::None
}

/// States of the index, middle, ring, and pinky fingers.
pub fn finger_states(hand: &NormalizedHand) -> [FingerState; 4] {
    let palm = palm_center(hand);
    Finger::FINGERS.map(|finger| finger_state(hand, finger, &palm))
}

fn finger_state(hand: &NormalizedHand, finger: Finger, palm: &Point3) -> FingerState {
    let joints = hand.metric();
    let base = joints.get(finger.base());
    let pip = joints.get(finger.pip());
    let tip = joints.get(finger.tip());

    let axis = pip.sub(&base);
    let axis_len = axis.length();
    if axis_len > 0.0 {
        let reach = tip.sub(&base).dot(&axis) / axis_len;
        if reach > EXTENDED_FRACTION * hand.hand_scale() {
            return FingerState::Extended;
        }
    }

    if tip.distance_to(palm) < pip.distance_to(palm) {
        FingerState::Folded
    } else {
        FingerState::Partial
    }
}

/// Mean of the wrist and the four finger knuckles.
fn palm_center(hand: &NormalizedHand) -> Point3 {
    let joints = hand.metric();
    let anchors = [
        Joint::Wrist,
        Joint::IndexMcp,
        Joint::MiddleMcp,
        Joint::RingMcp,
        Joint::PinkyMcp,
    ];
    let n = anchors.len() as f64;
    let sum = anchors.iter().fold(Point3::default(), |acc, &joint| {
        let p = joints.get(joint);
        Point3::new(acc.x + p.x, acc.y + p.y, acc.z + p.z)
    });
    Point3::new(sum.x / n, sum.y / n, sum.z / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use gesturemouse_hand_model::synthetic::{HandBuilder, SyntheticPose};

    fn label(builder: HandBuilder) -> PoseLabel {
        let hand = builder.build();
        let normalized = normalize(&hand.joints, 1.0, false).unwrap();
        classify(&normalized, hand.confidence, &GestureConfig::default())
    }

    fn hand(pose: SyntheticPose) -> HandBuilder {
        HandBuilder::new(0.5, 0.8, 0.2).pose(pose)
    }

    #[test]
    fn test_canonical_poses() {
        assert_eq!(label(hand(SyntheticPose::Point)), PoseLabel::Point);
        assert_eq!(label(hand(SyntheticPose::TwoFinger)), PoseLabel::TwoFinger);
        assert_eq!(
            label(hand(SyntheticPose::PinchIndex { ratio: 0.04 })),
            PoseLabel::PinchPrimary
        );
        assert_eq!(
            label(hand(SyntheticPose::PinchMiddle { ratio: 0.04 })),
            PoseLabel::PinchSecondary
        );
        assert_eq!(label(hand(SyntheticPose::OpenPalm)), PoseLabel::None);
        assert_eq!(label(hand(SyntheticPose::Fist)), PoseLabel::None);
    }

    #[test]
    fn test_open_pinch_is_point() {
        assert_eq!(
            label(hand(SyntheticPose::PinchIndex { ratio: 0.5 })),
            PoseLabel::Point
        );
    }

    #[test]
    fn test_pinch_threshold_is_strict() {
        assert_eq!(
            label(hand(SyntheticPose::PinchIndex { ratio: 0.049 })),
            PoseLabel::PinchPrimary
        );
        assert_eq!(
            label(hand(SyntheticPose::PinchIndex { ratio: 0.051 })),
            PoseLabel::Point
        );
    }

    #[test]
    fn test_primary_pinch_wins_tie() {
        // Index and middle tips side by side with the thumb touching both.
        let base = hand(SyntheticPose::TwoFinger);
        let tip = base.joints().get(Joint::IndexTip);
        let builder = base
            .with_joint(Joint::MiddleTip, Point3::new(tip.x + 0.004, tip.y, 0.0))
            .with_joint(Joint::ThumbTip, Point3::new(tip.x + 0.002, tip.y, 0.0));

        let normalized = normalize(&builder.joints(), 1.0, false).unwrap();
        let config = GestureConfig::default();
        assert!(
            normalized.scaled_distance(Joint::ThumbTip, Joint::MiddleTip) < config.pinch_threshold
        );
        assert_eq!(label(builder), PoseLabel::PinchPrimary);
    }

    #[test]
    fn test_converged_fingers_are_not_two_finger() {
        let base = hand(SyntheticPose::TwoFinger);
        let joints = base.joints();
        let index = joints.get(Joint::IndexTip);
        let middle = joints.get(Joint::MiddleTip);
        let builder = base.with_joint(
            Joint::MiddleTip,
            Point3::new(index.x + 0.01, middle.y, middle.z),
        );
        assert_eq!(label(builder), PoseLabel::None);
    }

    #[test]
    fn test_low_confidence_is_none() {
        assert_eq!(
            label(hand(SyntheticPose::Point).confidence(0.5)),
            PoseLabel::None
        );
        assert_eq!(
            label(hand(SyntheticPose::Point).confidence(f32::NAN)),
            PoseLabel::None
        );
    }

    #[test]
    fn test_classification_is_scale_invariant() {
        for scale in [0.05, 0.1, 0.3] {
            let builder = HandBuilder::new(0.5, 0.8, scale).pose(SyntheticPose::TwoFinger);
            assert_eq!(label(builder), PoseLabel::TwoFinger, "scale={scale}");
        }
    }

    #[test]
    fn test_finger_states_for_point() {
        let normalized = normalize(&hand(SyntheticPose::Point).joints(), 1.0, false).unwrap();
        assert_eq!(
            finger_states(&normalized),
            [
                FingerState::Extended,
                FingerState::Folded,
                FingerState::Folded,
                FingerState::Folded
            ]
        );
    }

    #[test]
    fn test_label_names() {
        assert_eq!(PoseLabel::PinchPrimary.as_str(), "pinch-primary");
        assert_eq!(PoseLabel::default(), PoseLabel::None);
    }
}
