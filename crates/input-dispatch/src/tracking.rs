//! Async tracking loop.
//!
//! Drains the latest-frame slot, runs each frame through the gesture
//! pipeline with the newest config snapshot, and dispatches the result.
//! Config and the pause flag arrive over `watch` channels so they can be
//! changed while the loop runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use gesturemouse_common::clock::{FpsMeter, FrameClock, TimestampNs};
use gesturemouse_common::config::GestureConfig;
use gesturemouse_common::error::GestureResult;
use gesturemouse_gesture_core::{FrameConsumer, FrameOutput, GesturePipeline, PipelineStats};

use crate::{ActionDispatcher, InputSink};

/// Handles for steering a running [`TrackingLoop`].
#[derive(Debug)]
pub struct TrackingControls {
    config: watch::Sender<GestureConfig>,
    paused: watch::Sender<bool>,
    stop_flag: Arc<AtomicBool>,
}

impl TrackingControls {
    /// Replace the config snapshot used from the next frame on.
    pub fn update_config(&self, config: GestureConfig) {
        self.config.send_replace(config);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.send_replace(paused);
    }

    /// Ask the loop to exit after the current frame.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

/// Totals reported when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackingSummary {
    pub pipeline: PipelineStats,
    pub frames_dropped: u64,
    pub actions_dispatched: u64,
    pub forced_releases: u64,
    pub sink_errors: u64,
    pub last_fps: f64,
}

/// The tracking loop that couples a frame slot, the pipeline, and a sink.
pub struct TrackingLoop<S> {
    pipeline: GesturePipeline,
    dispatcher: ActionDispatcher<S>,
    frames: FrameConsumer,
    config: watch::Receiver<GestureConfig>,
    paused: watch::Receiver<bool>,
    stop_flag: Arc<AtomicBool>,
    clock: FrameClock,
    fps: FpsMeter,
    last_timestamp_ns: TimestampNs,
    sink_errors: u64,
}

impl<S: InputSink> TrackingLoop<S> {
    /// Create a loop and the controls that steer it.
    pub fn new(
        pipeline: GesturePipeline,
        sink: S,
        frames: FrameConsumer,
        config: GestureConfig,
    ) -> (Self, TrackingControls) {
        let (config_tx, config_rx) = watch::channel(config);
        let (paused_tx, paused_rx) = watch::channel(pipeline.is_paused());
        let stop_flag = Arc::new(AtomicBool::new(false));

        let tracking = Self {
            pipeline,
            dispatcher: ActionDispatcher::new(sink),
            frames,
            config: config_rx,
            paused: paused_rx,
            stop_flag: stop_flag.clone(),
            clock: FrameClock::start(),
            fps: FpsMeter::new(),
            last_timestamp_ns: 0,
            sink_errors: 0,
        };
        let controls = TrackingControls {
            config: config_tx,
            paused: paused_tx,
            stop_flag,
        };
        (tracking, controls)
    }

    /// Process at most one pending frame. Returns `None` when the slot was
    /// empty or tracking is paused.
    pub fn step(&mut self) -> Option<FrameOutput> {
        self.apply_pause();
        if self.pipeline.is_paused() {
            return None;
        }

        let frame = self.frames.take()?;
        let config = self.config.borrow_and_update().clone();
        let output = self.pipeline.process(&frame, &config);
        self.last_timestamp_ns = frame.timestamp_ns;

        if let Err(e) = self.dispatcher.dispatch(&output) {
            self.sink_errors += 1;
            tracing::warn!(error = %e, "Input sink error");
        }

        if let Some(fps) = self.fps.tick(self.clock.now_ns()) {
            tracing::debug!(fps, "Tracking rate");
        }

        Some(output)
    }

    fn apply_pause(&mut self) {
        let paused = *self.paused.borrow_and_update();
        if paused == self.pipeline.is_paused() {
            return;
        }

        self.pipeline.set_paused(paused);
        if paused {
            if let Err(e) = self.dispatcher.release_all(self.last_timestamp_ns) {
                self.sink_errors += 1;
                tracing::warn!(error = %e, "Failed to release buttons on pause");
            }
        } else if self.frames.take().is_some() {
            tracing::debug!("Discarded stale frame on resume");
        }
    }

    /// Run until stopped or until the frame source disconnects and the
    /// slot is drained. A paused loop ends as soon as the source is gone.
    pub async fn run(&mut self) -> GestureResult<TrackingSummary> {
        tracing::info!(sink = %self.dispatcher.sink().name(), "Tracking loop started");

        while !self.stop_flag.load(Ordering::Relaxed) {
            if self.step().is_none() {
                if !self.frames.is_connected() {
                    // The last frame may have landed after the previous take.
                    // While paused it would be discarded on resume.
                    if self.pipeline.is_paused() || self.step().is_none() {
                        tracing::info!("Frame source closed");
                        break;
                    }
                    continue;
                }
                tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
            }
        }

        self.dispatcher.release_all(self.last_timestamp_ns)?;
        self.dispatcher.flush()?;

        let summary = self.summary();
        tracing::info!(
            frames = summary.pipeline.frames,
            dropped = summary.frames_dropped,
            actions = summary.actions_dispatched,
            "Tracking loop stopped"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> TrackingSummary {
        TrackingSummary {
            pipeline: self.pipeline.stats(),
            frames_dropped: self.frames.dropped(),
            actions_dispatched: self.dispatcher.actions_dispatched(),
            forced_releases: self.dispatcher.forced_releases(),
            sink_errors: self.sink_errors,
            last_fps: self.fps.current_fps(),
        }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher<S> {
        &self.dispatcher
    }

    pub fn pipeline(&self) -> &GesturePipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::RecordingSink;
    use gesturemouse_gesture_core::{latest_frame_slot, FrameStatus};
    use gesturemouse_hand_model::action::OutputAction;
    use gesturemouse_hand_model::frame::HandFrame;
    use gesturemouse_hand_model::geometry::ScreenSize;
    use gesturemouse_hand_model::synthetic::{HandBuilder, SyntheticPose};

    const FRAME_NS: u64 = 33_000_000;

    fn pinch(i: u64) -> HandFrame {
        HandFrame::single(
            i * FRAME_NS,
            HandBuilder::new(0.5, 0.8, 0.2)
                .pose(SyntheticPose::PinchIndex { ratio: 0.04 })
                .build(),
        )
    }

    fn new_loop() -> (
        TrackingLoop<RecordingSink>,
        TrackingControls,
        gesturemouse_gesture_core::FramePublisher,
    ) {
        let (publisher, consumer) = latest_frame_slot();
        let (tracking, controls) = TrackingLoop::new(
            GesturePipeline::new(ScreenSize::new(1920, 1080)),
            RecordingSink::new(),
            consumer,
            GestureConfig::default(),
        );
        (tracking, controls, publisher)
    }

    #[test]
    fn test_step_processes_latest_frame_only() {
        let (mut tracking, _controls, publisher) = new_loop();
        assert!(tracking.step().is_none());

        publisher.publish(HandFrame::empty(0));
        publisher.publish(HandFrame::empty(FRAME_NS));
        let output = tracking.step().unwrap();
        assert_eq!(output.timestamp_ns, FRAME_NS);
        assert_eq!(output.status, FrameStatus::HandLost);
        assert_eq!(tracking.summary().frames_dropped, 1);
    }

    #[test]
    fn test_pause_releases_held_button_and_halts_consumption() {
        let (mut tracking, controls, publisher) = new_loop();
        for i in 0..20 {
            publisher.publish(pinch(i));
            tracking.step();
        }
        assert_eq!(
            tracking.dispatcher().sink().actions(),
            vec![OutputAction::LeftDown]
        );

        controls.set_paused(true);
        publisher.publish(pinch(20));
        assert!(tracking.step().is_none());
        assert_eq!(
            tracking.dispatcher().sink().actions(),
            vec![OutputAction::LeftDown, OutputAction::LeftUp]
        );

        // The frame published during the pause is stale on resume.
        controls.set_paused(false);
        assert!(tracking.step().is_none());
        assert!(!tracking.pipeline().is_paused());
    }

    #[test]
    fn test_config_updates_apply_to_next_frame() {
        let (mut tracking, controls, publisher) = new_loop();
        controls.update_config(GestureConfig {
            detection_confidence_min: 0.99,
            ..Default::default()
        });
        publisher.publish(pinch(0));
        let output = tracking.step().unwrap();
        assert_eq!(output.status, FrameStatus::LowConfidence);
    }

    #[tokio::test]
    async fn test_run_drains_until_source_closes() {
        let (mut tracking, _controls, publisher) = new_loop();
        let producer = std::thread::spawn(move || {
            for i in 0..5 {
                publisher.publish(pinch(i));
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
            publisher.publish(HandFrame::empty(5 * FRAME_NS));
        });

        let summary = tracking.run().await.unwrap();
        producer.join().unwrap();

        assert!(summary.pipeline.frames >= 1);
        assert_eq!(summary.pipeline.frames + summary.frames_dropped, 6);
        assert_eq!(summary.sink_errors, 0);
    }

    #[tokio::test]
    async fn test_paused_run_ends_when_source_closes() {
        let (mut tracking, controls, publisher) = new_loop();
        controls.set_paused(true);
        publisher.publish(pinch(0));
        drop(publisher);

        let summary = tokio::time::timeout(std::time::Duration::from_secs(5), tracking.run())
            .await
            .expect("paused loop kept polling after the source closed")
            .unwrap();
        assert_eq!(summary.pipeline.frames, 0);
        assert!(tracking.pipeline().is_paused());
    }

    #[tokio::test]
    async fn test_stop_flag_ends_run() {
        let (mut tracking, controls, _publisher) = new_loop();
        controls.stop();
        let summary = tracking.run().await.unwrap();
        assert_eq!(summary.pipeline.frames, 0);
    }
}
