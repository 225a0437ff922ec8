//! Single-slot handoff between the pose source thread and the pipeline.
//!
//! The producer overwrites the slot; the consumer takes whatever is newest.
//! Frames the consumer never saw are counted as dropped. Exactly one
//! publisher and one consumer exist per slot.

use std::sync::{Arc, Mutex, MutexGuard};

use gesturemouse_hand_model::frame::HandFrame;

#[derive(Debug, Default)]
struct Slot {
    frame: Option<HandFrame>,
    published: u64,
    dropped: u64,
}

type SharedSlot = Arc<Mutex<Slot>>;

fn lock(slot: &SharedSlot) -> MutexGuard<'_, Slot> {
    // Slot state stays consistent even if a holder panicked.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Create a connected publisher/consumer pair.
pub fn latest_frame_slot() -> (FramePublisher, FrameConsumer) {
    let slot = SharedSlot::default();
    (
        FramePublisher {
            slot: Arc::clone(&slot),
        },
        FrameConsumer { slot },
    )
}

/// Writing half of the slot.
#[derive(Debug)]
pub struct FramePublisher {
    slot: SharedSlot,
}

impl FramePublisher {
    /// Store `frame` as the newest frame. Returns `true` if an unconsumed
    /// frame was overwritten.
    pub fn publish(&self, frame: HandFrame) -> bool {
        let mut slot = lock(&self.slot);
        slot.published += 1;
        let overwrote = slot.frame.replace(frame).is_some();
        if overwrote {
            slot.dropped += 1;
        }
        overwrote
    }

    /// Whether the consumer half still exists.
    pub fn is_connected(&self) -> bool {
        Arc::strong_count(&self.slot) > 1
    }
}

/// Reading half of the slot.
#[derive(Debug)]
pub struct FrameConsumer {
    slot: SharedSlot,
}

impl FrameConsumer {
    /// Take the newest frame, leaving the slot empty.
    pub fn take(&self) -> Option<HandFrame> {
        lock(&self.slot).frame.take()
    }

    /// Frames overwritten before they were taken.
    pub fn dropped(&self) -> u64 {
        lock(&self.slot).dropped
    }

    /// Frames published so far.
    pub fn published(&self) -> u64 {
        lock(&self.slot).published
    }

    /// Whether the publisher half still exists.
    pub fn is_connected(&self) -> bool {
        Arc::strong_count(&self.slot) > 1
    }
}
