//! GestureMouse Input Dispatch
//!
//! Carries the gesture core's per-frame actions to an input sink. Uses a
//! pluggable sink architecture:
//!
//! - **Recording:** Keeps actions in memory (tests, replay)
//! - **Log:** Emits each action as a tracing event
//! - **JSONL:** Appends actions to a file or stdout
//!
//! The [`ActionDispatcher`] tracks which buttons the sink currently holds
//! down and releases them itself when the core reports the hand lost or
//! tracking paused, since the core never emits a synthetic release.

pub mod sinks;
pub mod tracking;
pub mod writer;

use gesturemouse_common::clock::TimestampNs;
use gesturemouse_common::error::GestureResult;
use gesturemouse_gesture_core::{FrameOutput, FrameStatus};
use gesturemouse_hand_model::action::{ButtonState, MouseButton, OutputAction};

pub use tracking::{TrackingControls, TrackingLoop, TrackingSummary};

/// Trait for input sinks.
pub trait InputSink: Send {
    /// Perform one action.
    fn apply(&mut self, timestamp_ns: TimestampNs, action: &OutputAction) -> GestureResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Flush any buffered actions.
    fn flush(&mut self) -> GestureResult<()> {
        Ok(())
    }
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn apply(&mut self, timestamp_ns: TimestampNs, action: &OutputAction) -> GestureResult<()> {
        (**self).apply(timestamp_ns, action)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn flush(&mut self) -> GestureResult<()> {
        (**self).flush()
    }
}

/// Forwards frame outputs to a sink, keeping button state balanced.
pub struct ActionDispatcher<S> {
    sink: S,
    held: [bool; 2],
    actions_dispatched: u64,
    forced_releases: u64,
}

impl<S: InputSink> ActionDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            held: [false; 2],
            actions_dispatched: 0,
            forced_releases: 0,
        }
    }

    /// Dispatch one frame's actions in order.
    ///
    /// Loss and pause statuses first release any button the sink still
    /// holds. Stops at the first sink error.
    pub fn dispatch(&mut self, output: &FrameOutput) -> GestureResult<()> {
        if output.status.is_loss() || output.status == FrameStatus::Paused {
            self.release_all(output.timestamp_ns)?;
        }
        for action in &output.actions {
            self.send(output.timestamp_ns, action)?;
        }
        Ok(())
    }

    /// Release every held button.
    pub fn release_all(&mut self, timestamp_ns: TimestampNs) -> GestureResult<()> {
        for button in [MouseButton::Left, MouseButton::Right] {
            if self.is_held(button) {
                tracing::debug!(button = button.as_str(), "Releasing held button");
                self.send(
                    timestamp_ns,
                    &OutputAction::button(button, ButtonState::Up),
                )?;
                self.forced_releases += 1;
            }
        }
        Ok(())
    }

    fn send(&mut self, timestamp_ns: TimestampNs, action: &OutputAction) -> GestureResult<()> {
        self.sink.apply(timestamp_ns, action)?;
        if let Some((button, state)) = action.as_button() {
            self.held[slot(button)] = state == ButtonState::Down;
        }
        self.actions_dispatched += 1;
        Ok(())
    }

    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held[slot(button)]
    }

    pub fn flush(&mut self) -> GestureResult<()> {
        self.sink.flush()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Actions delivered to the sink, including forced releases.
    pub fn actions_dispatched(&self) -> u64 {
        self.actions_dispatched
    }

    /// Releases issued on loss or pause.
    pub fn forced_releases(&self) -> u64 {
        self.forced_releases
    }
}

fn slot(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
    }
}
