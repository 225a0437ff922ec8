//! Application and gesture configuration.
//!
//! The gesture core reads a [`GestureConfig`] snapshot once per frame. Every
//! field is independently bounded: out-of-range values are clamped by
//! [`GestureConfig::clamped`], never rejected, so a bad config file degrades
//! behavior instead of stopping the tracking loop.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clock::FrameClock;
use crate::error::{GestureError, GestureResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gesture pipeline parameters.
    pub gestures: GestureConfig,

    /// Target screen dimensions.
    pub screen: ScreenConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Numeric parameters consumed by the gesture pipeline each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pointer motion amplification. Values above 1 amplify incremental
    /// motion rather than absolute position.
    pub sensitivity: f64,

    /// Smoothing strength in `[0, 1)`; the EMA weight of a new sample is
    /// `1 - smoothing`.
    pub smoothing: f64,

    /// Pinch fires when fingertip distance / hand scale drops below this.
    pub pinch_threshold: f64,

    /// Minimum per-frame midpoint displacement / hand scale that scrolls.
    pub scroll_threshold: f64,

    /// Scroll units per normalized unit of midpoint travel (x100).
    pub scroll_sensitivity: f64,

    /// Re-arm lockout after a click channel releases.
    pub click_debounce_ms: u64,

    /// A pinch held longer than this escalates from tap to press-and-hold.
    pub hold_threshold_ms: u64,

    /// Hands reported below this confidence are treated as not detected.
    pub detection_confidence_min: f32,

    /// Sub-rectangle of frame space that maps onto the full screen.
    pub active_area: ActiveArea,

    /// Pointer smoothing algorithm.
    pub filter: FilterKind,

    /// One-step linear prediction on the filtered pointer.
    pub prediction: bool,

    /// Mirror x before classification and mapping (selfie-view cameras).
    pub mirror: bool,

    pub cursor_control_enabled: bool,
    pub left_click_enabled: bool,
    pub right_click_enabled: bool,
    pub scroll_enabled: bool,
}

/// Pointer smoothing algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Exponentially-weighted moving average.
    #[default]
    Ema,
    /// Mean of the last N samples; N grows with smoothing.
    MovingAverage,
    /// Speed-adaptive low-pass (One Euro).
    OneEuro,
    /// 1D Kalman filter per axis.
    Kalman,
}

/// Active tracking rectangle, normalized to frame space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveArea {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// Screen dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gesturemouse=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl ActiveArea {
    /// Smallest allowed edge length.
    pub const MIN_EDGE: f64 = 0.05;

    /// The whole frame.
    pub const FULL: ActiveArea = ActiveArea {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Create an area, clamping to the unit square.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        let w = sanitize(w, 1.0).clamp(Self::MIN_EDGE, 1.0);
        let h = sanitize(h, 1.0).clamp(Self::MIN_EDGE, 1.0);
        Self {
            x: sanitize(x, 0.0).clamp(0.0, 1.0 - w),
            y: sanitize(y, 0.0).clamp(0.0, 1.0 - h),
            w,
            h,
        }
    }

    /// Centered area leaving `margin` on every side.
    pub fn with_margin(margin: f64) -> Self {
        let margin = sanitize(margin, 0.0).clamp(0.0, 0.45);
        Self::new(margin, margin, 1.0 - 2.0 * margin, 1.0 - 2.0 * margin)
    }

    /// Remap a frame-space point into `[0, 1] x [0, 1]` relative to this
    /// area. Points outside saturate at the edges.
    pub fn remap(&self, px: f64, py: f64) -> (f64, f64) {
        (
            ((px - self.x) / self.w).clamp(0.0, 1.0),
            ((py - self.y) / self.h).clamp(0.0, 1.0),
        )
    }

    fn clamped(&self) -> Self {
        Self::new(self.x, self.y, self.w, self.h)
    }
}

impl Default for ActiveArea {
    fn default() -> Self {
        Self::with_margin(0.1)
    }
}

impl GestureConfig {
    pub const SENSITIVITY_RANGE: (f64, f64) = (0.1, 5.0);
    pub const SMOOTHING_MAX: f64 = 0.99;
    pub const PINCH_RANGE: (f64, f64) = (0.005, 1.0);
    pub const SCROLL_SENSITIVITY_RANGE: (f64, f64) = (0.1, 10.0);
    pub const DEBOUNCE_MAX_MS: u64 = 5_000;
    pub const HOLD_RANGE_MS: (u64, u64) = (50, 10_000);

    /// Copy of this config with every field forced into its valid range.
    /// Non-finite values fall back to the default for that field.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            sensitivity: sanitize(self.sensitivity, d.sensitivity)
                .clamp(Self::SENSITIVITY_RANGE.0, Self::SENSITIVITY_RANGE.1),
            smoothing: sanitize(self.smoothing, d.smoothing).clamp(0.0, Self::SMOOTHING_MAX),
            pinch_threshold: sanitize(self.pinch_threshold, d.pinch_threshold)
                .clamp(Self::PINCH_RANGE.0, Self::PINCH_RANGE.1),
            scroll_threshold: sanitize(self.scroll_threshold, d.scroll_threshold).clamp(0.0, 1.0),
            scroll_sensitivity: sanitize(self.scroll_sensitivity, d.scroll_sensitivity).clamp(
                Self::SCROLL_SENSITIVITY_RANGE.0,
                Self::SCROLL_SENSITIVITY_RANGE.1,
            ),
            click_debounce_ms: self.click_debounce_ms.min(Self::DEBOUNCE_MAX_MS),
            hold_threshold_ms: self
                .hold_threshold_ms
                .clamp(Self::HOLD_RANGE_MS.0, Self::HOLD_RANGE_MS.1),
            detection_confidence_min: if self.detection_confidence_min.is_finite() {
                self.detection_confidence_min.clamp(0.0, 1.0)
            } else {
                d.detection_confidence_min
            },
            active_area: self.active_area.clamped(),
            ..self.clone()
        }
    }

    /// Whether clamping would change any field.
    pub fn is_in_range(&self) -> bool {
        self.clamped() == *self
    }

    /// EMA weight given to each new pointer sample.
    pub fn alpha(&self) -> f64 {
        1.0 - self.smoothing.clamp(0.0, Self::SMOOTHING_MAX)
    }

    pub fn click_debounce_ns(&self) -> u64 {
        FrameClock::ms_to_ns(self.click_debounce_ms)
    }

    pub fn hold_threshold_ns(&self) -> u64 {
        FrameClock::ms_to_ns(self.hold_threshold_ms)
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.5,
            smoothing: 0.7,
            pinch_threshold: 0.05,
            scroll_threshold: 0.02,
            scroll_sensitivity: 5.0,
            click_debounce_ms: 300,
            hold_threshold_ms: 500,
            detection_confidence_min: 0.7,
            active_area: ActiveArea::default(),
            filter: FilterKind::Ema,
            prediction: false,
            mirror: false,
            cursor_control_enabled: true,
            left_click_enabled: true,
            right_click_enabled: true,
            scroll_enabled: true,
        }
    }
}

/// Map the user-facing 1–10 smoothing scale onto `[0, 0.9]`.
pub fn smoothing_from_level(level: u8) -> f64 {
    (level.clamp(1, 10) - 1) as f64 / 10.0
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Missing fields take defaults;
    /// out-of-range gesture values are clamped.
    pub fn load_from(path: &Path) -> GestureResult<Self> {
        if !path.exists() {
            return Err(GestureError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;

        if !config.gestures.is_in_range() {
            tracing::warn!(path = %path.display(), "Gesture config out of range; clamping");
            config.gestures = config.gestures.clamped();
        }
        if config.screen.width == 0 || config.screen.height == 0 {
            return Err(GestureError::config(format!(
                "screen size must be non-zero, got {}x{}",
                config.screen.width, config.screen.height
            )));
        }
        Ok(config)
    }

    /// Save config to an explicit path as pretty JSON.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("gesturemouse").join("config.json")
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
