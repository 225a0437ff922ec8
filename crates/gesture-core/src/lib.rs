//! GestureMouse Gesture Core
//!
//! Converts a noisy per-frame stream of hand joints into stable pointer
//! motion and discrete input actions:
//! - **Normalize:** Aspect-correct joints and measure the hand scale
//! - **Classify:** Map one frame's joints to a canonical pose label
//! - **Gesture:** Debounced, edge-triggered click and scroll state machines
//! - **Motion Filter:** Smooth the pointer anchor over time
//! - **Mapper:** Project the smoothed anchor onto absolute screen pixels
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! Each frame is processed to completion by [`GesturePipeline::process`]
//! before the next is accepted; [`latest_frame`] provides the single-slot
//! handoff for producers running on another thread.

pub mod classify;
pub mod gesture;
pub mod latest_frame;
pub mod mapper;
pub mod motion_filter;
pub mod normalize;
pub mod pipeline;

pub use classify::{classify, PoseLabel};
pub use gesture::{ClickChannel, ClickPhase, ScrollChannel};
pub use latest_frame::{latest_frame_slot, FrameConsumer, FramePublisher};
pub use mapper::{map_point, MapAnchor, PointerMapper};
pub use motion_filter::MotionFilter;
pub use normalize::{normalize, NormalizedHand, ScrollMidpoint};
pub use pipeline::{select_primary, FrameOutput, FrameStatus, GesturePipeline, PipelineStats};
