//! Pointer anchor smoothing.
//!
//! Every algorithm is driven by the single `smoothing` strength in
//! `[0, 1)`, where larger values mean more smoothing. Strength is re-read on
//! every update, so a hot-reloaded config takes effect without a reset;
//! changing the algorithm itself starts from a fresh state.

use std::collections::VecDeque;

use gesturemouse_common::clock::{FrameClock, TimestampNs};
use gesturemouse_common::config::{FilterKind, GestureConfig};
use gesturemouse_hand_model::geometry::Point2D;

/// One Euro speed coefficient.
const ONE_EURO_BETA: f64 = 0.007;

/// One Euro derivative cutoff in Hz.
const ONE_EURO_D_CUTOFF: f64 = 1.0;

/// Fallback sample period when timestamps do not advance.
const MIN_DT_SECS: f64 = 1e-3;

/// Stateful smoother for the pointer anchor.
#[derive(Debug, Clone, Default)]
pub struct MotionFilter {
    kind: Option<FilterKind>,
    x: AxisFilter,
    y: AxisFilter,
    last_timestamp_ns: Option<TimestampNs>,
    estimate: Option<Point2D>,
    previous_estimate: Option<Point2D>,
}

impl MotionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw sample and return the (optionally predicted) estimate.
    ///
    /// The first sample after construction or [`reset`](Self::reset) is
    /// returned unchanged.
    pub fn update(
        &mut self,
        raw: Point2D,
        timestamp_ns: TimestampNs,
        config: &GestureConfig,
    ) -> Point2D {
        if self.kind != Some(config.filter) {
            self.reset();
            self.kind = Some(config.filter);
            self.x = AxisFilter::new(config.filter);
            self.y = AxisFilter::new(config.filter);
        }

        let dt = match self.last_timestamp_ns {
            Some(last) if timestamp_ns > last => FrameClock::ns_to_secs(timestamp_ns - last),
            _ => MIN_DT_SECS,
        };
        self.last_timestamp_ns = Some(timestamp_ns);

        let smoothing = config.smoothing.clamp(0.0, GestureConfig::SMOOTHING_MAX);
        let alpha = config.alpha();
        let estimate = Point2D::new(
            self.x.filter(raw.x, smoothing, alpha, dt),
            self.y.filter(raw.y, smoothing, alpha, dt),
        );

        self.previous_estimate = self.estimate.replace(estimate);

        match (config.prediction, self.previous_estimate) {
            (true, Some(prev)) => Point2D::new(
                estimate.x + (estimate.x - prev.x),
                estimate.y + (estimate.y - prev.y),
            ),
            _ => estimate,
        }
    }

    /// Current smoothed estimate, without prediction.
    pub fn estimate(&self) -> Option<Point2D> {
        self.estimate
    }

    /// Drop all history. The next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.last_timestamp_ns = None;
        self.estimate = None;
        self.previous_estimate = None;
    }
}

/// Per-axis filter state.
#[derive(Debug, Clone)]
enum AxisFilter {
    Ema {
        value: Option<f64>,
    },
    MovingAverage {
        samples: VecDeque<f64>,
    },
    OneEuro {
        value: LowPass,
        derivative: LowPass,
        previous_raw: Option<f64>,
    },
    Kalman {
        value: Option<f64>,
        variance: f64,
    },
}

impl Default for AxisFilter {
    fn default() -> Self {
        Self::new(FilterKind::Ema)
    }
}

impl AxisFilter {
    fn new(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Ema => Self::Ema { value: None },
            FilterKind::MovingAverage => Self::MovingAverage {
                samples: VecDeque::new(),
            },
            FilterKind::OneEuro => Self::OneEuro {
                value: LowPass::default(),
                derivative: LowPass::default(),
                previous_raw: None,
            },
            FilterKind::Kalman => Self::Kalman {
                value: None,
                variance: 1.0,
            },
        }
    }

    /// `alpha` is the EMA weight of `raw`, `1 - smoothing`.
    fn filter(&mut self, raw: f64, smoothing: f64, alpha: f64, dt: f64) -> f64 {
        match self {
            Self::Ema { value } => {
                let next = match value {
                    Some(prev) => alpha * raw + (1.0 - alpha) * *prev,
                    None => raw,
                };
                *value = Some(next);
                next
            }
            Self::MovingAverage { samples } => {
                let window = 1 + (smoothing * 10.0).round() as usize;
                samples.push_back(raw);
                while samples.len() > window {
                    samples.pop_front();
                }
                samples.iter().sum::<f64>() / samples.len() as f64
            }
            Self::OneEuro {
                value,
                derivative,
                previous_raw,
            } => {
                let min_cutoff = 0.3 + 4.7 * (1.0 - smoothing);
                let dx = previous_raw.map_or(0.0, |prev| (raw - prev) / dt);
                *previous_raw = Some(raw);

                let edx = derivative.filter(dx, smoothing_factor(dt, ONE_EURO_D_CUTOFF));
                let cutoff = min_cutoff + ONE_EURO_BETA * edx.abs();
                value.filter(raw, smoothing_factor(dt, cutoff))
            }
            Self::Kalman { value, variance } => {
                let q = 0.001 + (1.0 - smoothing) * 0.01;
                let r = 0.001 + smoothing * 0.04;
                let x = value.get_or_insert(raw);

                *variance += q;
                let gain = *variance / (*variance + r);
                *x += gain * (raw - *x);
                *variance *= 1.0 - gain;
                *x
            }
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Ema { value } => *value = None,
            Self::MovingAverage { samples } => samples.clear(),
            Self::OneEuro {
                value,
                derivative,
                previous_raw,
            } => {
                value.reset();
                derivative.reset();
                *previous_raw = None;
            }
            Self::Kalman { value, variance } => {
                *value = None;
                *variance = 1.0;
            }
        }
    }
}

/// First-order low-pass used by the One Euro filter.
#[derive(Debug, Clone, Copy, Default)]
struct LowPass {
    previous: Option<f64>,
}

impl LowPass {
    fn filter(&mut self, value: f64, alpha: f64) -> f64 {
        let next = match self.previous {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        self.previous = Some(next);
        next
    }

    fn reset(&mut self) {
        self.previous = None;
    }
}

/// alpha = 1 / (1 + tau/Te), tau = 1/(2*pi*fc)
fn smoothing_factor(dt: f64, cutoff: f64) -> f64 {
    let r = 2.0 * std::f64::consts::PI * cutoff * dt;
    r / (r + 1.0)
}
