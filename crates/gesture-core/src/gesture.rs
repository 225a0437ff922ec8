//! Gesture state machines.
//!
//! One instance per channel (left click, right click, scroll). Transitions
//! are edge-triggered on the change of the channel's label, so holding a
//! pose never repeat-fires.
//!
//! Click channel transitions:
//!
//! | From       | Condition                          | To         | Emits      |
//! |------------|------------------------------------|------------|------------|
//! | `Idle`     | rising edge                        | `Armed`    |            |
//! | `Armed`    | falling edge                       | `Cooldown` | down, up   |
//! | `Armed`    | still high, held >= hold threshold | `Fired`    | down       |
//! | `Armed`    | low (missed falling edge)          | `Idle`     |            |
//! | `Fired`    | falling edge                       | `Cooldown` | up         |
//! | `Cooldown` | debounce elapsed                   | `Idle`     |            |
//!
//! A `Cooldown` that expires on a frame carrying a rising edge goes straight
//! to `Armed`. Rising edges seen while the cooldown is still running are
//! dropped.

use serde::{Deserialize, Serialize};

use gesturemouse_common::clock::TimestampNs;
use gesturemouse_common::config::GestureConfig;
use gesturemouse_hand_model::action::{ButtonState, MouseButton, OutputAction};

use crate::normalize::ScrollMidpoint;

/// Phase of a click channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickPhase {
    #[default]
    Idle,
    /// Pinch seen; waiting to learn whether it is a tap or a hold.
    Armed,
    /// Hold escalated; the button is down.
    Fired,
    /// Re-arm lockout after a release.
    Cooldown,
}

/// Label change between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Rising,
    Falling,
    High,
    Low,
}

impl Edge {
    fn between(was_active: bool, active: bool) -> Self {
        match (was_active, active) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            (true, true) => Edge::High,
            (false, false) => Edge::Low,
        }
    }
}

/// Debounced tap/hold state machine for one mouse button.
#[derive(Debug, Clone)]
pub struct ClickChannel {
    button: MouseButton,
    phase: ClickPhase,
    last_transition_ns: TimestampNs,
    was_active: bool,
}

impl ClickChannel {
    pub fn new(button: MouseButton) -> Self {
        Self {
            button,
            phase: ClickPhase::Idle,
            last_transition_ns: 0,
            was_active: false,
        }
    }

    pub fn button(&self) -> MouseButton {
        self.button
    }

    pub fn phase(&self) -> ClickPhase {
        self.phase
    }

    /// Whether this channel has emitted a down with no matching up.
    pub fn is_holding(&self) -> bool {
        self.phase == ClickPhase::Fired
    }

    /// Advance by one frame. `active` is whether this frame's label is the
    /// channel's pinch label.
    pub fn step(
        &mut self,
        active: bool,
        now_ns: TimestampNs,
        config: &GestureConfig,
        out: &mut Vec<OutputAction>,
    ) {
        let edge = Edge::between(self.was_active, active);
        self.was_active = active;
        let elapsed = now_ns.saturating_sub(self.last_transition_ns);

        match (self.phase, edge) {
            (ClickPhase::Idle, Edge::Rising) => self.enter(ClickPhase::Armed, now_ns),
            (ClickPhase::Idle, _) => {}

            // Also reached when dropped frames hid the hold threshold; down+up
            // is what a hold-then-release would have emitted.
            (ClickPhase::Armed, Edge::Falling) => {
                out.push(OutputAction::button(self.button, ButtonState::Down));
                out.push(OutputAction::button(self.button, ButtonState::Up));
                tracing::debug!(button = self.button.as_str(), "Tap");
                self.enter(ClickPhase::Cooldown, now_ns);
            }
            (ClickPhase::Armed, Edge::High | Edge::Rising) => {
                if elapsed >= config.hold_threshold_ns() {
                    out.push(OutputAction::button(self.button, ButtonState::Down));
                    tracing::debug!(button = self.button.as_str(), "Hold started");
                    self.enter(ClickPhase::Fired, now_ns);
                }
            }
            (ClickPhase::Armed, Edge::Low) => self.enter(ClickPhase::Idle, now_ns),

            (ClickPhase::Fired, Edge::Falling | Edge::Low) => {
                out.push(OutputAction::button(self.button, ButtonState::Up));
                tracing::debug!(button = self.button.as_str(), "Hold released");
                self.enter(ClickPhase::Cooldown, now_ns);
            }
            (ClickPhase::Fired, _) => {}

            (ClickPhase::Cooldown, edge) => {
                if elapsed >= config.click_debounce_ns() {
                    if edge == Edge::Rising {
                        self.enter(ClickPhase::Armed, now_ns);
                    } else {
                        self.enter(ClickPhase::Idle, now_ns);
                    }
                }
            }
        }
    }

    /// Force back to `Idle` without emitting anything. Returns whether a
    /// down was outstanding.
    pub fn reset(&mut self) -> bool {
        let was_holding = self.is_holding();
        self.phase = ClickPhase::Idle;
        self.last_transition_ns = 0;
        self.was_active = false;
        was_holding
    }

    fn enter(&mut self, phase: ClickPhase, now_ns: TimestampNs) {
        tracing::trace!(
            button = self.button.as_str(),
            from = ?self.phase,
            to = ?phase,
            "Click transition"
        );
        self.phase = phase;
        self.last_transition_ns = now_ns;
    }
}

/// Scroll channel state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum ScrollPhase {
    #[default]
    Idle,
    Scrolling { last_midpoint: ScrollMidpoint },
}

/// Vertical scroll driven by the two-finger midpoint.
#[derive(Debug, Clone, Default)]
pub struct ScrollChannel {
    phase: ScrollPhase,
}

impl ScrollChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.phase, ScrollPhase::Scrolling { .. })
    }

    /// Advance by one frame.
    ///
    /// `hand_scale` is in metric units. Metric displacements at or below
    /// `scroll_threshold` hand scales are jitter and are dropped, not
    /// accumulated. Scroll units come from the image-space displacement.
    pub fn step(
        &mut self,
        active: bool,
        midpoint: ScrollMidpoint,
        hand_scale: f64,
        config: &GestureConfig,
        out: &mut Vec<OutputAction>,
    ) {
        match (self.phase, active) {
            (ScrollPhase::Idle, true) => {
                tracing::debug!("Scroll started");
                self.phase = ScrollPhase::Scrolling {
                    last_midpoint: midpoint,
                };
            }
            (ScrollPhase::Idle, false) => {}
            (ScrollPhase::Scrolling { last_midpoint }, true) => {
                let metric_dy = midpoint.metric.y - last_midpoint.metric.y;
                if hand_scale > 0.0 && (metric_dy / hand_scale).abs() > config.scroll_threshold {
                    let image_dy = midpoint.image.y - last_midpoint.image.y;
                    let delta = scroll_units(image_dy, config.scroll_sensitivity);
                    if delta != 0 {
                        out.push(OutputAction::ScrollBy { delta });
                    }
                }
                self.phase = ScrollPhase::Scrolling {
                    last_midpoint: midpoint,
                };
            }
            (ScrollPhase::Scrolling { .. }, false) => {
                tracing::debug!("Scroll ended");
                self.phase = ScrollPhase::Idle;
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = ScrollPhase::Idle;
    }
}

/// Convert a vertical midpoint displacement to scroll units. Moving the
/// fingers up (negative image-space dy) scrolls up (positive delta).
pub fn scroll_units(dy: f64, scroll_sensitivity: f64) -> i32 {
    let units = (-dy * scroll_sensitivity * 100.0).round();
    units.clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesturemouse_hand_model::geometry::Point2D;

    const MS: u64 = 1_000_000;

    fn config() -> GestureConfig {
        GestureConfig::default()
    }

    /// A midpoint on a square frame, where both spaces agree.
    fn mid(y: f64) -> ScrollMidpoint {
        let point = Point2D::new(0.5, y);
        ScrollMidpoint {
            image: point,
            metric: point,
        }
    }

    /// Feed `(active, t_ms)` pairs and collect everything emitted.
    fn run(channel: &mut ClickChannel, frames: &[(bool, u64)]) -> Vec<OutputAction> {
        let config = config();
        let mut out = Vec::new();
        for &(active, t) in frames {
            channel.step(active, t * MS, &config, &mut out);
        }
        out
    }

    #[test]
    fn test_tap_emits_down_up_on_release() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        let out = run(&mut channel, &[(true, 0), (true, 33)]);
        assert!(out.is_empty());
        assert_eq!(channel.phase(), ClickPhase::Armed);

        let out = run(&mut channel, &[(false, 66)]);
        assert_eq!(out, vec![OutputAction::LeftDown, OutputAction::LeftUp]);
        assert_eq!(channel.phase(), ClickPhase::Cooldown);
    }

    #[test]
    fn test_hold_escalates_once() {
        let mut channel = ClickChannel::new(MouseButton::Right);
        let frames: Vec<(bool, u64)> = (0..30).map(|i| (true, i * 33)).collect();
        let out = run(&mut channel, &frames);
        assert_eq!(out, vec![OutputAction::RightDown]);
        assert!(channel.is_holding());

        let out = run(&mut channel, &[(false, 1_000)]);
        assert_eq!(out, vec![OutputAction::RightUp]);
        assert_eq!(channel.phase(), ClickPhase::Cooldown);
    }

    #[test]
    fn test_hold_threshold_boundary() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        let out = run(&mut channel, &[(true, 100), (true, 599)]);
        assert!(out.is_empty());
        let out = run(&mut channel, &[(true, 600)]);
        assert_eq!(out, vec![OutputAction::LeftDown]);
    }

    #[test]
    fn test_release_after_unseen_hold_threshold() {
        // Frames between 0 and 700 ms were dropped.
        let mut channel = ClickChannel::new(MouseButton::Left);
        let out = run(&mut channel, &[(true, 0), (false, 700)]);
        assert_eq!(out, vec![OutputAction::LeftDown, OutputAction::LeftUp]);
        assert_eq!(channel.phase(), ClickPhase::Cooldown);
    }

    #[test]
    fn test_debounce_suppresses_second_click() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        let out = run(
            &mut channel,
            &[
                (true, 0),
                (false, 33),
                (true, 100),
                (false, 133),
                (false, 166),
            ],
        );
        assert_eq!(out, vec![OutputAction::LeftDown, OutputAction::LeftUp]);
    }

    #[test]
    fn test_click_after_debounce() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        let out = run(
            &mut channel,
            &[(true, 0), (false, 33), (false, 400), (true, 433), (false, 466)],
        );
        assert_eq!(
            out,
            vec![
                OutputAction::LeftDown,
                OutputAction::LeftUp,
                OutputAction::LeftDown,
                OutputAction::LeftUp
            ]
        );
    }

    #[test]
    fn test_rising_edge_on_cooldown_expiry_arms() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        run(&mut channel, &[(true, 0), (false, 33), (true, 333)]);
        assert_eq!(channel.phase(), ClickPhase::Armed);
    }

    #[test]
    fn test_pinch_held_through_cooldown_does_not_rearm() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        let out = run(
            &mut channel,
            &[(true, 0), (false, 33), (true, 100), (true, 400), (true, 2_000)],
        );
        assert_eq!(out, vec![OutputAction::LeftDown, OutputAction::LeftUp]);
        assert_eq!(channel.phase(), ClickPhase::Idle);
    }

    #[test]
    fn test_reset_discards_pending_down() {
        let mut channel = ClickChannel::new(MouseButton::Left);
        run(&mut channel, &[(true, 0), (true, 600)]);
        assert!(channel.is_holding());

        assert!(channel.reset());
        assert_eq!(channel.phase(), ClickPhase::Idle);

        // Pose still held after re-acquisition: a fresh rising edge is
        // required before anything fires again.
        let mut out = Vec::new();
        channel.step(true, 700 * MS, &config(), &mut out);
        channel.step(true, 2_000 * MS, &config(), &mut out);
        assert_eq!(out, vec![OutputAction::LeftDown]);
        assert!(!ClickChannel::new(MouseButton::Left).reset());
    }

    #[test]
    fn test_scroll_emits_per_frame_motion() {
        let config = config();
        let mut channel = ScrollChannel::new();
        let mut out = Vec::new();

        channel.step(true, mid(0.5), 0.2, &config, &mut out);
        assert!(channel.is_scrolling());
        assert!(out.is_empty());

        channel.step(true, mid(0.48), 0.2, &config, &mut out);
        assert_eq!(out, vec![OutputAction::ScrollBy { delta: 10 }]);

        out.clear();
        channel.step(true, mid(0.50), 0.2, &config, &mut out);
        assert_eq!(out, vec![OutputAction::ScrollBy { delta: -10 }]);
    }

    #[test]
    fn test_scroll_jitter_is_not_accumulated() {
        let config = config();
        let mut channel = ScrollChannel::new();
        let mut out = Vec::new();
        channel.step(true, mid(0.5), 0.2, &config, &mut out);
        for i in 1..=10 {
            let y = 0.5 - i as f64 * 0.003;
            channel.step(true, mid(y), 0.2, &config, &mut out);
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_scroll_reentry_uses_fresh_reference() {
        let config = config();
        let mut channel = ScrollChannel::new();
        let mut out = Vec::new();
        channel.step(true, mid(0.5), 0.2, &config, &mut out);
        channel.step(false, mid(0.5), 0.2, &config, &mut out);
        assert!(!channel.is_scrolling());
        channel.step(true, mid(0.2), 0.2, &config, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_scroll_units_follow_image_space_travel() {
        // 16:9 frame: metric y is image y * 9/16, as is the hand scale.
        let wide = |y: f64| {
            let image = Point2D::new(0.5, y);
            ScrollMidpoint {
                image,
                metric: Point2D::new(0.5, y * 9.0 / 16.0),
            }
        };
        let config = config();
        let mut channel = ScrollChannel::new();
        let mut out = Vec::new();
        channel.step(true, wide(0.5), 0.2 * 9.0 / 16.0, &config, &mut out);
        channel.step(true, wide(0.48), 0.2 * 9.0 / 16.0, &config, &mut out);
        assert_eq!(out, vec![OutputAction::ScrollBy { delta: 10 }]);
    }

    #[test]
    fn test_scroll_units_direction() {
        assert_eq!(scroll_units(-0.02, 5.0), 10);
        assert_eq!(scroll_units(0.02, 5.0), -10);
        assert_eq!(scroll_units(0.0, 5.0), 0);
    }
}
