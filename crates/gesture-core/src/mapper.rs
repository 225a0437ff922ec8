//! Coordinate mapping from the smoothed anchor to screen pixels.
//!
//! The anchor is first remapped from the active area to the unit square,
//! saturating at the area's edges. Sensitivity then scales the motion since
//! the previous mapped point rather than the absolute position, so a small
//! active area can still cover a large screen. The result is clamped to the
//! unit square before conversion to pixels.

use serde::{Deserialize, Serialize};

use gesturemouse_common::config::ActiveArea;
use gesturemouse_hand_model::geometry::{Point2D, ScreenPoint, ScreenSize};

/// Reference point for incremental mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapAnchor {
    /// Previous anchor, remapped into the active area's unit square.
    pub area_point: Point2D,

    /// Previous mapped output in the unit square.
    pub output: Point2D,
}

/// Map a normalized anchor to a screen pixel.
///
/// With no `previous` anchor the remapped point is used directly. Returns the
/// pixel and the anchor to pass in on the next frame.
pub fn map_point(
    point: Point2D,
    previous: Option<&MapAnchor>,
    sensitivity: f64,
    area: &ActiveArea,
    screen: ScreenSize,
) -> (ScreenPoint, MapAnchor) {
    let (u, v) = area.remap(point.x, point.y);
    let area_point = Point2D::new(u, v);

    let output = match previous {
        Some(prev) => Point2D::new(
            prev.output.x + (area_point.x - prev.area_point.x) * sensitivity,
            prev.output.y + (area_point.y - prev.area_point.y) * sensitivity,
        )
        .clamp_unit(),
        None => area_point,
    };

    (screen.denormalize(output), MapAnchor { area_point, output })
}

/// Stateful wrapper around [`map_point`] that carries the anchor between
/// frames.
#[derive(Debug, Clone, Default)]
pub struct PointerMapper {
    anchor: Option<MapAnchor>,
    rebase_pending: bool,
}

impl PointerMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(
        &mut self,
        point: Point2D,
        sensitivity: f64,
        area: &ActiveArea,
        screen: ScreenSize,
    ) -> ScreenPoint {
        if std::mem::take(&mut self.rebase_pending) {
            if let Some(anchor) = self.anchor.as_mut() {
                let (u, v) = area.remap(point.x, point.y);
                anchor.area_point = Point2D::new(u, v);
            }
        }

        let (pixel, anchor) = map_point(point, self.anchor.as_ref(), sensitivity, area, screen);
        self.anchor = Some(anchor);
        pixel
    }

    /// Keep the current output position but take the next anchor as the new
    /// motion reference, so the pointer resumes from where it stopped.
    pub fn rebase(&mut self) {
        self.rebase_pending = self.anchor.is_some();
    }

    /// Forget the output position entirely.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.rebase_pending = false;
    }

    pub fn anchor(&self) -> Option<&MapAnchor> {
        self.anchor.as_ref()
    }
}
