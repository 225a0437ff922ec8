//! Output actions handed to the input sink.
//!
//! Each processed frame yields an ordered, possibly empty list of actions.
//! Pointer coordinates are absolute screen pixels; scroll deltas are signed
//! sink-defined scroll units (positive scrolls up).

use serde::{Deserialize, Serialize};

use gesturemouse_common::clock::TimestampNs;

use crate::geometry::ScreenPoint;

/// One intended input action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputAction {
    /// Move the pointer to an absolute screen position.
    MoveTo { x: i32, y: i32 },
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    /// Scroll vertically by `delta` units.
    ScrollBy { delta: i32 },
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
}

/// Button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Down,
    Up,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl OutputAction {
    pub fn move_to(point: ScreenPoint) -> Self {
        Self::MoveTo {
            x: point.x,
            y: point.y,
        }
    }

    /// Button press or release for the given button.
    pub fn button(button: MouseButton, state: ButtonState) -> Self {
        match (button, state) {
            (MouseButton::Left, ButtonState::Down) => Self::LeftDown,
            (MouseButton::Left, ButtonState::Up) => Self::LeftUp,
            (MouseButton::Right, ButtonState::Down) => Self::RightDown,
            (MouseButton::Right, ButtonState::Up) => Self::RightUp,
        }
    }

    /// Decompose a button action.
    pub fn as_button(&self) -> Option<(MouseButton, ButtonState)> {
        match self {
            Self::LeftDown => Some((MouseButton::Left, ButtonState::Down)),
            Self::LeftUp => Some((MouseButton::Left, ButtonState::Up)),
            Self::RightDown => Some((MouseButton::Right, ButtonState::Down)),
            Self::RightUp => Some((MouseButton::Right, ButtonState::Up)),
            _ => None,
        }
    }

    /// Whether this is a discrete event (anything but pointer motion).
    pub fn is_discrete(&self) -> bool {
        !matches!(self, Self::MoveTo { .. })
    }

    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            Self::MoveTo { x, y } => Some(ScreenPoint::new(*x, *y)),
            _ => None,
        }
    }
}

/// An action stamped with the frame it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedAction {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(flatten)]
    pub action: OutputAction,
}

/// Header line of a recorded action stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStreamHeader {
    pub schema_version: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl TimedAction {
    pub fn new(timestamp_ns: TimestampNs, action: OutputAction) -> Self {
        Self {
            timestamp_ns,
            action,
        }
    }
}

impl ActionStreamHeader {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            screen_width,
            screen_height,
        }
    }
}

/// Parse timed actions from JSONL content, skipping `#` header lines.
pub fn parse_actions(jsonl: &str) -> Result<Vec<TimedAction>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
