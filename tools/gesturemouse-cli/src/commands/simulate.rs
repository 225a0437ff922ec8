//! Run a scripted synthetic session through the pipeline.
//!
//! The script points and drifts right, taps, holds a right-button pinch,
//! drags two fingers upward, loses the hand, then shows an open palm.

use std::path::PathBuf;

use gesturemouse_common::clock::FrameClock;
use gesturemouse_common::config::AppConfig;
use gesturemouse_gesture_core::GesturePipeline;
use gesturemouse_hand_model::frame::{serialize_frames, FrameStreamHeader, HandFrame};
use gesturemouse_hand_model::geometry::ScreenSize;
use gesturemouse_hand_model::synthetic::{HandBuilder, SyntheticPose};
use gesturemouse_input_dispatch::sinks::RecordingSink;
use gesturemouse_input_dispatch::ActionDispatcher;

const SCALE: f64 = 0.2;

/// Synthetic camera frames are square.
const FRAME_EDGE_PX: u32 = 720;

pub fn run(config: &AppConfig, fps: u32, frames_out: Option<PathBuf>) -> anyhow::Result<()> {
    let frames = scripted_session(fps);

    if let Some(path) = &frames_out {
        let clock = FrameClock::start();
        let header = FrameStreamHeader::new(clock.epoch_wall(), FRAME_EDGE_PX, FRAME_EDGE_PX, fps);
        let jsonl = serialize_frames(Some(&header), &frames)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, jsonl)?;
        tracing::info!(path = %path.display(), frames = frames.len(), "Saved synthetic frames");
    }

    let screen = ScreenSize::from(config.screen);
    let mut pipeline = GesturePipeline::new(screen);
    let mut dispatcher = ActionDispatcher::new(RecordingSink::new());

    for frame in &frames {
        let output = pipeline.process(frame, &config.gestures);
        dispatcher.dispatch(&output)?;
    }
    if let Some(last) = frames.last() {
        dispatcher.release_all(last.timestamp_ns)?;
    }

    println!("GestureMouse Simulation");
    println!("{}", "=".repeat(50));
    let mut moves = 0usize;
    for timed in dispatcher.sink().timed() {
        if timed.action.is_discrete() {
            println!(
                "  {:>8.1} ms  {:?}",
                FrameClock::ns_to_ms(timed.timestamp_ns),
                timed.action
            );
        } else {
            moves += 1;
        }
    }

    let stats = pipeline.stats();
    println!();
    println!("Frames:         {} ({} fps)", stats.frames, fps.max(1));
    println!("Tracked:        {}", stats.tracked);
    println!("Hand lost:      {}", stats.hand_lost);
    println!("Pointer moves:  {}", moves);
    println!("Forced release: {}", dispatcher.forced_releases());

    Ok(())
}

/// The scripted session at the given frame rate.
pub fn scripted_session(fps: u32) -> Vec<HandFrame> {
    let interval = FrameClock::frame_interval_ns(fps);
    let mut script: Vec<Option<HandBuilder>> = Vec::new();

    let wrist = (0.5, 0.8);
    let at = |dx: f64, pose: SyntheticPose| {
        HandBuilder::new(wrist.0 + dx, wrist.1, SCALE).pose(pose)
    };

    // Point and drift right.
    for i in 0..15 {
        script.push(Some(at(0.005 * i as f64, SyntheticPose::Point)));
    }
    let dx = 0.075;

    // Tap: a short primary pinch.
    for _ in 0..2 {
        script.push(Some(at(dx, SyntheticPose::PinchIndex { ratio: 0.04 })));
    }
    for _ in 0..15 {
        script.push(Some(at(dx, SyntheticPose::Point)));
    }

    // Secondary pinch held past the hold threshold.
    for _ in 0..25 {
        script.push(Some(at(dx, SyntheticPose::PinchMiddle { ratio: 0.02 })));
    }
    for _ in 0..15 {
        script.push(Some(at(dx, SyntheticPose::Point)));
    }

    // Two-finger drag upward.
    let start = 0.5 + 1.775 * SCALE;
    for i in 0..=5 {
        script.push(Some(
            HandBuilder::new(0.5, start - 0.02 * i as f64, SCALE).pose(SyntheticPose::TwoFinger),
        ));
    }

    // Hand leaves the frame, then returns open.
    script.extend((0..5).map(|_| None));
    for _ in 0..5 {
        script.push(Some(at(dx, SyntheticPose::OpenPalm)));
    }

    script
        .into_iter()
        .enumerate()
        .map(|(i, builder)| {
            let t = i as u64 * interval;
            match builder {
                Some(builder) => HandFrame::single(t, builder.build()),
                None => HandFrame::empty(t),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesturemouse_common::config::GestureConfig;
    use gesturemouse_hand_model::action::OutputAction;
    use gesturemouse_hand_model::frame::parse_frames;

    fn discrete_actions(frames: &[HandFrame]) -> Vec<OutputAction> {
        let mut pipeline = GesturePipeline::new(ScreenSize::new(1920, 1080));
        let config = GestureConfig::default();
        frames
            .iter()
            .flat_map(|frame| pipeline.process(frame, &config).actions)
            .filter(OutputAction::is_discrete)
            .collect()
    }

    #[test]
    fn test_scripted_session_actions() {
        let actions = discrete_actions(&scripted_session(30));
        let mut expected = vec![
            OutputAction::LeftDown,
            OutputAction::LeftUp,
            OutputAction::RightDown,
            OutputAction::RightUp,
        ];
        expected.extend([OutputAction::ScrollBy { delta: 10 }; 5]);
        assert_eq!(actions, expected);
    }

    #[test]
    fn test_scripted_session_timestamps_increase() {
        let frames = scripted_session(60);
        assert!(frames
            .windows(2)
            .all(|pair| pair[0].timestamp_ns < pair[1].timestamp_ns));
        assert_eq!(frames.iter().filter(|f| f.hands.is_empty()).count(), 5);
    }

    #[test]
    fn test_saved_frames_parse_back() {
        let frames = scripted_session(30);
        let header = FrameStreamHeader::new("2026-01-01T00:00:00Z", FRAME_EDGE_PX, FRAME_EDGE_PX, 30);
        let jsonl = serialize_frames(Some(&header), &frames).unwrap();
        assert_eq!(parse_frames(&jsonl).unwrap().len(), frames.len());
    }
}
