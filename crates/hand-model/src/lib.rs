//! GestureMouse Hand Model
//!
//! Defines the data contracts crossing the gesture core's boundary:
//! - **Landmarks:** The 21 anatomically labeled joints of one hand
//! - **Frames:** Per-frame detections from the pose source, with JSONL encoding
//! - **Actions:** Pointer and button actions handed to the input sink
//! - **Geometry:** Normalized 2D points and screen-space pixels
//! - **Synthetic:** Deterministic hand builders for tests and simulation
//!
//! Joint coordinates are normalized to `[0.0, 1.0]` in image space (y grows
//! downward); screen coordinates are absolute pixels.

pub mod action;
pub mod frame;
pub mod geometry;
pub mod landmark;
pub mod synthetic;

pub use action::*;
pub use frame::*;
pub use geometry::*;
pub use landmark::*;
