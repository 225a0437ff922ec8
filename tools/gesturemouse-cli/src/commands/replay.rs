//! Replay a recorded frame stream through the gesture pipeline.

use std::path::PathBuf;

use gesturemouse_common::config::AppConfig;
use gesturemouse_common::error::GestureError;
use gesturemouse_gesture_core::GesturePipeline;
use gesturemouse_hand_model::action::ActionStreamHeader;
use gesturemouse_hand_model::frame::{parse_frame_header, parse_frames};
use gesturemouse_hand_model::geometry::ScreenSize;
use gesturemouse_input_dispatch::ActionDispatcher;

use super::{open_sink, SinkKind};

pub fn run(
    config: &AppConfig,
    frames: PathBuf,
    output: Option<PathBuf>,
    sink_kind: SinkKind,
    screen_width: Option<u32>,
    screen_height: Option<u32>,
) -> anyhow::Result<()> {
    if !frames.exists() {
        return Err(GestureError::FileNotFound { path: frames }.into());
    }

    let content = std::fs::read_to_string(&frames)?;
    let parsed = parse_frames(&content).map_err(|e| {
        GestureError::frame_source(format!("Failed to parse {}: {e}", frames.display()))
    })?;

    // Streams recorded from non-square cameras carry their aspect in the header.
    let aspect = parse_frame_header(&content).map(|header| header.aspect_ratio());

    let screen = ScreenSize::new(
        screen_width.unwrap_or(config.screen.width),
        screen_height.unwrap_or(config.screen.height),
    );
    let header = ActionStreamHeader::new(screen.width, screen.height);
    let sink = open_sink(sink_kind, output.as_deref(), &header)?;
    let stdout_stream = sink_kind == SinkKind::Jsonl && output.is_none();

    tracing::info!(
        frames = parsed.len(),
        screen_width = screen.width,
        screen_height = screen.height,
        "Replaying frame stream"
    );

    let mut pipeline = GesturePipeline::new(screen);
    let mut dispatcher = ActionDispatcher::new(sink);
    let mut last_timestamp_ns = 0;
    let mut duration_secs = 0.0;

    for mut frame in parsed {
        if let Some(aspect) = aspect {
            frame = frame.with_aspect_ratio(aspect);
        }
        let out = pipeline.process(&frame, &config.gestures);
        dispatcher.dispatch(&out)?;
        last_timestamp_ns = frame.timestamp_ns;
        duration_secs = frame.timestamp_secs();
    }

    dispatcher.release_all(last_timestamp_ns)?;
    dispatcher.flush()?;

    let stats = pipeline.stats();
    let written = dispatcher.actions_dispatched();
    if stdout_stream {
        // Stdout carries the action stream, so the summary goes to the log.
        tracing::info!(
            frames = stats.frames,
            tracked = stats.tracked,
            hand_lost = stats.hand_lost,
            actions = written,
            duration_secs,
            "Replay complete"
        );
        return Ok(());
    }

    println!("Replay complete:");
    println!("  Frames:         {}", stats.frames);
    println!("  Duration:       {:.2} s", duration_secs);
    println!("  Tracked:        {}", stats.tracked);
    println!("  Hand lost:      {}", stats.hand_lost);
    println!("  Low confidence: {}", stats.low_confidence);
    println!("  Degenerate:     {}", stats.degenerate);
    println!("  Actions:        {}", written);
    println!("  Sink:           {}", dispatcher.sink().name());
    if let (SinkKind::Jsonl, Some(path)) = (sink_kind, &output) {
        println!("  Output:         {}", path.display());
    }

    Ok(())
}
