//! Clock and timing utilities for the per-frame pipeline.
//!
//! Every frame handed to the gesture core carries a monotonic timestamp in
//! nanoseconds. This module provides:
//! - A tracking clock anchored to the moment tracking started
//! - Conversions between nanoseconds, milliseconds, and seconds
//! - A frames-per-second meter for the tracking loop

use std::time::Instant;

/// Monotonic nanoseconds since tracking start.
pub type TimestampNs = u64;

/// A tracking clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment tracking started).
#[derive(Debug, Clone)]
pub struct FrameClock {
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl FrameClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Nanoseconds elapsed since tracking start.
    pub fn now_ns(&self) -> TimestampNs {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Wall-clock time at tracking start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    pub fn ns_to_ms(ns: TimestampNs) -> f64 {
        ns as f64 / 1_000_000.0
    }

    pub fn ms_to_ns(ms: u64) -> TimestampNs {
        ms.saturating_mul(1_000_000)
    }

    pub fn ns_to_secs(ns: TimestampNs) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Nominal interval between frames at the given rate.
    pub fn frame_interval_ns(fps: u32) -> TimestampNs {
        1_000_000_000 / fps.max(1) as u64
    }
}

/// Frame rate meter for the tracking loop.
///
/// Counts frames and produces a rate once at least one second has passed
/// since the previous report.
#[derive(Debug, Default)]
pub struct FpsMeter {
    window_start_ns: Option<TimestampNs>,
    frames: u32,
    current_fps: f64,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed frame. Returns the new rate when a one-second
    /// window closes, `None` otherwise.
    pub fn tick(&mut self, now_ns: TimestampNs) -> Option<f64> {
        let start = *self.window_start_ns.get_or_insert(now_ns);
        self.frames += 1;

        let elapsed = now_ns.saturating_sub(start);
        if elapsed >= 1_000_000_000 {
            self.current_fps = self.frames as f64 / FrameClock::ns_to_secs(elapsed);
            self.frames = 0;
            self.window_start_ns = Some(now_ns);
            return Some(self.current_fps);
        }
        None
    }

    /// Most recently reported rate (0 before the first window closes).
    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = FrameClock::start();
        assert!(clock.now_ns() < 1_000_000_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(FrameClock::ms_to_ns(300), 300_000_000);
        assert!((FrameClock::ns_to_ms(1_500_000) - 1.5).abs() < 1e-9);
        assert!((FrameClock::ns_to_secs(2_500_000_000) - 2.5).abs() < 1e-9);
        assert_eq!(FrameClock::frame_interval_ns(30), 33_333_333);
        assert_eq!(FrameClock::frame_interval_ns(0), 1_000_000_000);
    }

    #[test]
    fn test_fps_meter_reports_once_per_second() {
        let mut meter = FpsMeter::new();
        let interval = FrameClock::frame_interval_ns(30);

        let mut reports = Vec::new();
        for i in 0..=70u64 {
            if let Some(fps) = meter.tick(i * interval) {
                reports.push(fps);
            }
        }

        assert_eq!(reports.len(), 2);
        assert!((reports[0] - 31.0).abs() < 0.5, "fps={}", reports[0]);
        assert_eq!(meter.current_fps(), reports[1]);
    }
}
