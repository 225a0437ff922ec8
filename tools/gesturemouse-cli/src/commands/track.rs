//! Track live frames from stdin.
//!
//! A reader thread parses JSONL frames from stdin and publishes each into
//! the latest-frame slot; the tracking loop consumes whatever is newest
//! and writes actions to stdout, or to the log with `--sink log`. Ctrl+C
//! stops tracking. When a config file was given, edits to it are picked up
//! while tracking runs.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use gesturemouse_common::config::AppConfig;
use gesturemouse_gesture_core::{latest_frame_slot, FramePublisher, GesturePipeline};
use gesturemouse_hand_model::action::ActionStreamHeader;
use gesturemouse_hand_model::frame::HandFrame;
use gesturemouse_hand_model::geometry::ScreenSize;
use gesturemouse_input_dispatch::{TrackingControls, TrackingLoop};

use super::{open_sink, SinkKind};

const RELOAD_POLL: Duration = Duration::from_millis(500);

pub async fn run(
    config: AppConfig,
    config_path: Option<PathBuf>,
    sink_kind: SinkKind,
    paused: bool,
) -> anyhow::Result<()> {
    let screen = ScreenSize::from(config.screen);
    let header = ActionStreamHeader::new(screen.width, screen.height);
    let sink = open_sink(sink_kind, None, &header)?;

    let mut pipeline = GesturePipeline::new(screen);
    pipeline.set_paused(paused);

    let (publisher, consumer) = latest_frame_slot();
    let (mut tracking, controls) = TrackingLoop::new(pipeline, sink, consumer, config.gestures);
    let controls = Arc::new(controls);

    let reader = std::thread::spawn(move || read_frames(std::io::stdin().lock(), publisher));

    // Stop on Ctrl+C
    let stop_controls = controls.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            stop_controls.stop();
        }
    });

    if let Some(path) = config_path {
        tokio::spawn(watch_config(path, controls.clone()));
    }

    tracing::info!(
        screen_width = screen.width,
        screen_height = screen.height,
        paused,
        "Tracking frames from stdin"
    );
    let summary = tracking.run().await?;

    // The reader only exits at end of input; after Ctrl+C it is left blocked
    // on stdin and torn down with the process.
    if reader.is_finished() {
        match reader.join() {
            Ok(lines) => tracing::debug!(lines, "Frame reader finished"),
            Err(_) => tracing::warn!("Frame reader panicked"),
        }
    }

    eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Publish every frame line from `input`. Returns the number of lines read.
fn read_frames(input: impl BufRead, publisher: FramePublisher) -> u64 {
    let mut lines = 0;
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read frame input");
                break;
            }
        };
        lines += 1;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<HandFrame>(line) {
            Ok(frame) => {
                publisher.publish(frame);
            }
            Err(e) => tracing::warn!(line = lines, error = %e, "Skipping malformed frame"),
        }
    }
    lines
}

/// Poll the config file's modification time and push new gesture settings
/// into the running loop.
async fn watch_config(path: PathBuf, controls: Arc<TrackingControls>) {
    let mut last_modified = modified(&path);
    loop {
        tokio::time::sleep(RELOAD_POLL).await;

        let current = modified(&path);
        if current == last_modified {
            continue;
        }
        last_modified = current;

        match AppConfig::load_from(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Config reloaded");
                controls.update_config(config.gestures);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config"),
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
