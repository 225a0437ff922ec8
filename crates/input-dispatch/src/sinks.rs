//! Input sink implementations.
//!
//! Each sink is a different destination for the core's actions. Sinks that
//! drive a real pointer live outside this crate and plug in through
//! [`InputSink`].

use gesturemouse_common::clock::TimestampNs;
use gesturemouse_common::error::GestureResult;
use gesturemouse_hand_model::action::{OutputAction, TimedAction};

use crate::InputSink;

/// Keeps every action in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: Vec<TimedAction>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded actions without timestamps.
    pub fn actions(&self) -> Vec<OutputAction> {
        self.recorded.iter().map(|timed| timed.action).collect()
    }

    pub fn timed(&self) -> &[TimedAction] {
        &self.recorded
    }
}

impl InputSink for RecordingSink {
    fn apply(&mut self, timestamp_ns: TimestampNs, action: &OutputAction) -> GestureResult<()> {
        self.recorded.push(TimedAction::new(timestamp_ns, *action));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Emits each action as a tracing event. Pointer moves log at `trace`,
/// everything else at `info`.
#[derive(Debug, Default)]
pub struct LogSink {
    applied: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }
}

impl InputSink for LogSink {
    fn apply(&mut self, timestamp_ns: TimestampNs, action: &OutputAction) -> GestureResult<()> {
        if action.is_discrete() {
            tracing::info!(t = timestamp_ns, action = ?action, "Input action");
        } else {
            tracing::trace!(t = timestamp_ns, action = ?action, "Pointer move");
        }
        self.applied += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
