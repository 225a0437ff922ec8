//! Per-frame gesture pipeline.
//!
//! [`GesturePipeline::process`] runs one frame to completion through
//! primary-hand selection, normalization, classification, the gesture state
//! machines, the motion filter, and the coordinate mapper. Frame-local
//! failures never propagate; they are reported as a [`FrameStatus`] and the
//! pipeline recovers on the next frame.

use serde::{Deserialize, Serialize};

use gesturemouse_common::clock::TimestampNs;
use gesturemouse_common::config::GestureConfig;
use gesturemouse_hand_model::action::{MouseButton, OutputAction};
use gesturemouse_hand_model::frame::{DetectedHand, HandFrame};
use gesturemouse_hand_model::geometry::{Point2D, ScreenPoint, ScreenSize};

use crate::classify::{classify, PoseLabel};
use crate::gesture::{ClickChannel, ScrollChannel};
use crate::mapper::PointerMapper;
use crate::motion_filter::MotionFilter;
use crate::normalize::normalize;

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// A primary hand was classified.
    Tracked,
    /// The primary hand's geometry was unusable; state was left untouched.
    DegenerateHand,
    /// Hands were reported, all below the confidence minimum.
    LowConfidence,
    /// No hands were reported.
    HandLost,
    /// Tracking is paused; the frame was ignored.
    Paused,
}

impl FrameStatus {
    /// Whether this status resets gesture and filter state.
    pub fn is_loss(&self) -> bool {
        matches!(self, Self::LowConfidence | Self::HandLost)
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub timestamp_ns: TimestampNs,
    pub status: FrameStatus,
    pub pose: PoseLabel,
    pub pointer_active: bool,

    /// Ordered actions for the input sink: button and scroll events first,
    /// then at most one pointer move.
    pub actions: Vec<OutputAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_scale: Option<f64>,
}

impl FrameOutput {
    fn idle(timestamp_ns: TimestampNs, status: FrameStatus) -> Self {
        Self {
            timestamp_ns,
            status,
            pose: PoseLabel::None,
            pointer_active: false,
            actions: Vec::new(),
            hand_scale: None,
        }
    }
}

/// Running counters for a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub frames: u64,
    pub tracked: u64,
    pub degenerate: u64,
    pub low_confidence: u64,
    pub hand_lost: u64,
    pub paused: u64,
    pub actions: u64,
}

impl PipelineStats {
    fn record(&mut self, output: &FrameOutput) {
        self.frames += 1;
        self.actions += output.actions.len() as u64;
        match output.status {
            FrameStatus::Tracked => self.tracked += 1,
            FrameStatus::DegenerateHand => self.degenerate += 1,
            FrameStatus::LowConfidence => self.low_confidence += 1,
            FrameStatus::HandLost => self.hand_lost += 1,
            FrameStatus::Paused => self.paused += 1,
        }
    }
}

/// Pick the one hand the pipeline follows this frame.
///
/// Hands below `min_confidence` are ignored. The most confident remaining
/// hand wins; equal confidences go to the hand whose wrist is nearest the
/// previous primary's wrist.
pub fn select_primary(
    hands: &[DetectedHand],
    min_confidence: f32,
    previous_wrist: Option<Point2D>,
) -> Option<&DetectedHand> {
    let mut best: Option<&DetectedHand> = None;
    for hand in hands {
        if hand.confidence.is_nan() || hand.confidence < min_confidence {
            continue;
        }
        best = match best {
            None => Some(hand),
            Some(current) if hand.confidence > current.confidence => Some(hand),
            Some(current) if hand.confidence == current.confidence => {
                match previous_wrist {
                    Some(wrist)
                        if hand.wrist().distance_to(&wrist)
                            < current.wrist().distance_to(&wrist) =>
                    {
                        Some(hand)
                    }
                    _ => Some(current),
                }
            }
            keep => keep,
        };
    }
    best
}

/// Stateful per-frame gesture pipeline for one primary hand.
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    screen: ScreenSize,
    left: ClickChannel,
    right: ClickChannel,
    scroll: ScrollChannel,
    filter: MotionFilter,
    mapper: PointerMapper,
    pointer_active: bool,
    last_move: Option<ScreenPoint>,
    primary_wrist: Option<Point2D>,
    tracking: bool,
    paused: bool,
    stats: PipelineStats,
}

impl GesturePipeline {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            left: ClickChannel::new(MouseButton::Left),
            right: ClickChannel::new(MouseButton::Right),
            scroll: ScrollChannel::new(),
            filter: MotionFilter::new(),
            mapper: PointerMapper::new(),
            pointer_active: false,
            last_move: None,
            primary_wrist: None,
            tracking: false,
            paused: false,
            stats: PipelineStats::default(),
        }
    }

    /// Process one frame against a config snapshot.
    pub fn process(&mut self, frame: &HandFrame, config: &GestureConfig) -> FrameOutput {
        let output = self.process_inner(frame, &config.clamped());
        self.stats.record(&output);
        output
    }

    fn process_inner(&mut self, frame: &HandFrame, config: &GestureConfig) -> FrameOutput {
        let now = frame.timestamp_ns;
        if self.paused {
            return FrameOutput::idle(now, FrameStatus::Paused);
        }

        let Some(hand) = select_primary(
            &frame.hands,
            config.detection_confidence_min,
            self.primary_wrist,
        ) else {
            let status = if frame.hands.is_empty() {
                FrameStatus::HandLost
            } else {
                FrameStatus::LowConfidence
            };
            self.on_hand_lost(status);
            return FrameOutput::idle(now, status);
        };

        let normalized = match normalize(&hand.joints, frame.aspect_ratio, config.mirror) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::trace!(error = %e, "Skipping frame");
                return FrameOutput::idle(now, FrameStatus::DegenerateHand);
            }
        };

        if !self.tracking {
            tracing::debug!(confidence = hand.confidence, "Hand acquired");
            self.tracking = true;
        }
        self.primary_wrist = Some(hand.wrist());

        let pose = classify(&normalized, hand.confidence, config);
        let mut actions = Vec::new();

        self.left.step(
            config.left_click_enabled && pose == PoseLabel::PinchPrimary,
            now,
            config,
            &mut actions,
        );
        self.right.step(
            config.right_click_enabled && pose == PoseLabel::PinchSecondary,
            now,
            config,
            &mut actions,
        );
        self.scroll.step(
            config.scroll_enabled && pose == PoseLabel::TwoFinger,
            normalized.scroll_midpoint(),
            normalized.hand_scale(),
            config,
            &mut actions,
        );

        let pointer_active = config.cursor_control_enabled && pose == PoseLabel::Point;
        if pointer_active {
            if !self.pointer_active {
                self.filter.reset();
                self.mapper.rebase();
            }
            let smoothed = self
                .filter
                .update(normalized.pointer_anchor(), now, config);
            let pixel = self
                .mapper
                .map(smoothed, config.sensitivity, &config.active_area, self.screen);
            if self.last_move != Some(pixel) {
                actions.push(OutputAction::move_to(pixel));
                self.last_move = Some(pixel);
            }
        }
        self.pointer_active = pointer_active;

        tracing::trace!(
            pose = pose.as_str(),
            actions = actions.len(),
            "Frame processed"
        );

        FrameOutput {
            timestamp_ns: now,
            status: FrameStatus::Tracked,
            pose,
            pointer_active,
            actions,
            hand_scale: Some(normalized.hand_scale()),
        }
    }

    fn on_hand_lost(&mut self, status: FrameStatus) {
        if self.tracking {
            tracing::debug!(status = ?status, "Hand lost");
            self.tracking = false;
        }
        let left_held = self.left.reset();
        let right_held = self.right.reset();
        if left_held || right_held {
            tracing::debug!(left_held, right_held, "Discarded in-flight hold");
        }
        if self.scroll.is_scrolling() {
            tracing::debug!("Scroll interrupted");
        }
        self.scroll.reset();
        self.filter.reset();
        self.mapper.rebase();
        self.pointer_active = false;
    }

    /// Honor the external pause signal. Entering pause clears all gesture
    /// and filter state.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        if paused {
            self.clear_state();
            tracing::info!("Tracking paused");
        } else {
            tracing::info!("Tracking resumed");
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Clear all state, as if freshly constructed. Counters are kept.
    pub fn reset(&mut self) {
        self.clear_state();
    }

    fn clear_state(&mut self) {
        self.left.reset();
        self.right.reset();
        self.scroll.reset();
        self.filter.reset();
        self.mapper.reset();
        self.pointer_active = false;
        self.last_move = None;
        self.primary_wrist = None;
        self.tracking = false;
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesturemouse_hand_model::landmark::Joint;
    use gesturemouse_hand_model::synthetic::{HandBuilder, SyntheticPose};

    const FRAME_NS: u64 = 33_000_000;

    fn pipeline() -> GesturePipeline {
        GesturePipeline::new(ScreenSize::new(1920, 1080))
    }

    fn frame(i: u64, builder: &HandBuilder) -> HandFrame {
        HandFrame::single(i * FRAME_NS, builder.build())
    }

    /// Index tip lands between pixel boundaries on a 1920x1080 screen.
    fn point_hand() -> HandBuilder {
        HandBuilder::new(0.5213, 0.8137, 0.2).pose(SyntheticPose::Point)
    }

    #[test]
    fn test_pointer_moves_only_when_changed() {
        let mut pipeline = pipeline();
        let config = GestureConfig::default();
        let hand = point_hand();

        let first = pipeline.process(&frame(0, &hand), &config);
        assert_eq!(first.status, FrameStatus::Tracked);
        assert_eq!(first.pose, PoseLabel::Point);
        assert!(first.pointer_active);
        assert_eq!(first.actions.len(), 1);
        assert!(first.actions[0].position().is_some());

        let second = pipeline.process(&frame(1, &hand), &config);
        assert!(second.actions.is_empty());
    }

    #[test]
    fn test_empty_frame_is_hand_lost() {
        let mut pipeline = pipeline();
        let output = pipeline.process(&HandFrame::empty(0), &GestureConfig::default());
        assert_eq!(output.status, FrameStatus::HandLost);
        assert!(output.actions.is_empty());
        assert_eq!(output.hand_scale, None);
    }

    #[test]
    fn test_low_confidence_is_treated_as_loss() {
        let mut pipeline = pipeline();
        let hand = point_hand().confidence(0.3);
        let output = pipeline.process(&frame(0, &hand), &GestureConfig::default());
        assert_eq!(output.status, FrameStatus::LowConfidence);
        assert!(output.status.is_loss());
        assert!(output.actions.is_empty());
    }

    #[test]
    fn test_degenerate_hand_leaves_state_untouched() {
        let mut pipeline = pipeline();
        let config = GestureConfig::default();
        let pinch = HandBuilder::new(0.5, 0.8, 0.2).pose(SyntheticPose::PinchIndex { ratio: 0.04 });
        pipeline.process(&frame(0, &pinch), &config);

        let wrist = pinch.joints().get(Joint::Wrist);
        let degenerate = pinch.clone().with_joint(Joint::MiddleMcp, wrist);
        let output = pipeline.process(&frame(1, &degenerate), &config);
        assert_eq!(output.status, FrameStatus::DegenerateHand);
        assert!(output.actions.is_empty());

        // The pinch is still armed: releasing it taps.
        let output = pipeline.process(&frame(2, &point_hand()), &config);
        assert_eq!(
            &output.actions[..2],
            &[OutputAction::LeftDown, OutputAction::LeftUp]
        );
    }

    #[test]
    fn test_pause_ignores_frames_and_clears_state() {
        let mut pipeline = pipeline();
        let config = GestureConfig::default();
        let pinch = HandBuilder::new(0.5, 0.8, 0.2).pose(SyntheticPose::PinchIndex { ratio: 0.04 });
        pipeline.process(&frame(0, &pinch), &config);

        pipeline.set_paused(true);
        assert!(pipeline.is_paused());
        let output = pipeline.process(&frame(1, &point_hand()), &config);
        assert_eq!(output.status, FrameStatus::Paused);
        assert!(output.actions.is_empty());

        pipeline.set_paused(false);
        let output = pipeline.process(&frame(2, &point_hand()), &config);
        assert!(output.actions.iter().all(|a| !a.is_discrete()));
        assert_eq!(pipeline.stats().paused, 1);
        assert_eq!(pipeline.stats().frames, 3);
    }

    #[test]
    fn test_disabled_cursor_never_moves() {
        let mut pipeline = pipeline();
        let config = GestureConfig {
            cursor_control_enabled: false,
            ..Default::default()
        };
        let output = pipeline.process(&frame(0, &point_hand()), &config);
        assert_eq!(output.pose, PoseLabel::Point);
        assert!(!output.pointer_active);
        assert!(output.actions.is_empty());
    }

    #[test]
    fn test_disabled_left_click_is_silent() {
        let mut pipeline = pipeline();
        let config = GestureConfig {
            left_click_enabled: false,
            ..Default::default()
        };
        let pinch = HandBuilder::new(0.5, 0.8, 0.2).pose(SyntheticPose::PinchIndex { ratio: 0.04 });
        pipeline.process(&frame(0, &pinch), &config);
        let output = pipeline.process(&frame(1, &point_hand()), &config);
        assert!(output.actions.iter().all(|a| !a.is_discrete()));
    }

    #[test]
    fn test_reacquired_pointer_resumes_in_place() {
        let mut pipeline = pipeline();
        let config = GestureConfig::default();
        let hand = point_hand();
        let first = pipeline.process(&frame(0, &hand), &config);

        pipeline.process(&HandFrame::empty(FRAME_NS), &config);

        // The hand comes back somewhere else; the cursor does not jump.
        let moved = hand.clone().translate(0.2, 0.0);
        let output = pipeline.process(&frame(2, &moved), &config);
        assert!(output.actions.is_empty());
        assert_eq!(pipeline.last_move, first.actions[0].position());
    }

    #[test]
    fn test_select_primary_prefers_confidence() {
        let low = HandBuilder::new(0.2, 0.8, 0.2).confidence(0.8).build();
        let high = HandBuilder::new(0.7, 0.8, 0.2).confidence(0.9).build();
        let hands = [low, high.clone()];
        assert_eq!(select_primary(&hands, 0.7, None), Some(&high));
        assert_eq!(select_primary(&hands, 0.95, None), None);
    }

    #[test]
    fn test_select_primary_ties_follow_previous() {
        let left = HandBuilder::new(0.2, 0.8, 0.2).build();
        let right = HandBuilder::new(0.7, 0.8, 0.2).build();
        let hands = [left.clone(), right.clone()];
        assert_eq!(
            select_primary(&hands, 0.7, Some(Point2D::new(0.75, 0.8))),
            Some(&right)
        );
        assert_eq!(
            select_primary(&hands, 0.7, Some(Point2D::new(0.1, 0.8))),
            Some(&left)
        );
        assert_eq!(select_primary(&hands, 0.7, None), Some(&left));
    }

    #[test]
    fn test_secondary_hand_is_ignored() {
        let mut pipeline = pipeline();
        let config = GestureConfig::default();
        let primary = point_hand().confidence(0.95).build();
        let other = HandBuilder::new(0.2, 0.8, 0.2)
            .pose(SyntheticPose::PinchIndex { ratio: 0.01 })
            .confidence(0.8)
            .build();
        let output = pipeline.process(&HandFrame::new(0, vec![other, primary]), &config);
        assert_eq!(output.pose, PoseLabel::Point);
    }

    #[test]
    fn test_mirror_flips_pointer() {
        let mut plain = pipeline();
        let mut mirrored = pipeline();
        let hand = HandBuilder::new(0.3, 0.8, 0.2);
        let a = plain.process(&frame(0, &hand), &GestureConfig::default());
        let b = mirrored.process(
            &frame(0, &hand),
            &GestureConfig {
                mirror: true,
                ..Default::default()
            },
        );
        let a = a.actions[0].position().unwrap();
        let b = b.actions[0].position().unwrap();
        assert!(a.x < 960 && b.x > 960);
        assert_eq!(a.y, b.y);
    }
}
