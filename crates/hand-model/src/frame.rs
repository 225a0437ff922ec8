//! Per-frame detections from the pose source.
//!
//! Recorded pose-source output is stored as JSONL: an optional header
//! comment line (`# {...}`) followed by one [`HandFrame`] per line.

use serde::{Deserialize, Serialize};

use gesturemouse_common::clock::TimestampNs;

use crate::landmark::{Joint, JointSet};

/// One detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    /// The 21 joints in normalized image space.
    pub joints: JointSet,

    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
}

impl DetectedHand {
    pub fn new(joints: JointSet, confidence: f32) -> Self {
        Self { joints, confidence }
    }

    /// Wrist position in image space.
    pub fn wrist(&self) -> crate::geometry::Point2D {
        self.joints.get(Joint::Wrist).xy()
    }
}

/// Everything the pose source reported for one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Monotonic nanoseconds since tracking start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Zero or more detected hands.
    #[serde(default)]
    pub hands: Vec<DetectedHand>,

    /// Frame width / height. Used to undo the per-axis normalization
    /// skew on non-square frames.
    #[serde(default = "square_aspect")]
    pub aspect_ratio: f64,
}

/// Header line of a recorded frame stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at tracking start (ISO 8601).
    pub epoch_wall: String,

    /// Camera frame dimensions in pixels.
    pub frame_width: u32,
    pub frame_height: u32,

    /// Nominal camera frame rate.
    pub fps: u32,
}

fn square_aspect() -> f64 {
    1.0
}

impl HandFrame {
    pub fn new(timestamp_ns: TimestampNs, hands: Vec<DetectedHand>) -> Self {
        Self {
            timestamp_ns,
            hands,
            aspect_ratio: 1.0,
        }
    }

    /// A frame in which no hand was detected.
    pub fn empty(timestamp_ns: TimestampNs) -> Self {
        Self::new(timestamp_ns, Vec::new())
    }

    /// A frame with exactly one hand.
    pub fn single(timestamp_ns: TimestampNs, hand: DetectedHand) -> Self {
        Self::new(timestamp_ns, vec![hand])
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Timestamp as fractional seconds since tracking start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }
}

impl FrameStreamHeader {
    pub fn new(epoch_wall: impl Into<String>, frame_width: u32, frame_height: u32, fps: u32) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            epoch_wall: epoch_wall.into(),
            frame_width,
            frame_height,
            fps,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.frame_width.max(1) as f64 / self.frame_height.max(1) as f64
    }
}

/// Parse frames from JSONL content (one JSON object per line).
/// Blank lines and `#` comment lines are skipped.
pub fn parse_frames(jsonl: &str) -> Result<Vec<HandFrame>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Extract the stream header from the first `#` comment line, if any.
pub fn parse_frame_header(jsonl: &str) -> Option<FrameStreamHeader> {
    jsonl
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.strip_prefix('#'))
        .and_then(|header| serde_json::from_str(header.trim()).ok())
}

/// Serialize frames to JSONL format, with an optional header line.
pub fn serialize_frames(
    header: Option<&FrameStreamHeader>,
    frames: &[HandFrame],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    if let Some(header) = header {
        output.push_str("# ");
        output.push_str(&serde_json::to_string(header)?);
        output.push('\n');
    }
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
