//! Normalized 2D points and screen-space types.

use serde::{Deserialize, Serialize};

use gesturemouse_common::config::ScreenConfig;

/// A 2D normalized point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Clamp both coordinates into `[0, 1]`.
    pub fn clamp_unit(&self) -> Point2D {
        Point2D::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

/// Physical screen dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    /// Create a screen size; zero dimensions are raised to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Convert `[0, 1]` coordinates to a pixel inside
    /// `[0, width) x [0, height)`.
    pub fn denormalize(&self, point: Point2D) -> ScreenPoint {
        let x = (point.x.clamp(0.0, 1.0) * self.width as f64) as i64;
        let y = (point.y.clamp(0.0, 1.0) * self.height as f64) as i64;
        ScreenPoint {
            x: x.clamp(0, self.width as i64 - 1) as i32,
            y: y.clamp(0, self.height as i64 - 1) as i32,
        }
    }
}

impl From<ScreenConfig> for ScreenSize {
    fn from(config: ScreenConfig) -> Self {
        Self::new(config.width, config.height)
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        ScreenConfig::default().into()
    }
}

/// Absolute screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
