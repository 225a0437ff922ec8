//! GestureMouse CLI: drive the gesture pipeline from the command line.
//!
//! Usage:
//!   gesturemouse replay <FRAMES>     Run the pipeline over a recorded frame stream
//!   gesturemouse simulate            Run a scripted synthetic session
//!   gesturemouse track               Track live frames read from stdin
//!   gesturemouse config init|show    Write or print the configuration
//!   gesturemouse check <PATH>        Validate a configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gesturemouse_common::config::{AppConfig, LoggingConfig};

mod commands;

use commands::SinkKind;

#[derive(Parser)]
#[command(
    name = "gesturemouse",
    about = "Turn hand-tracking frames into pointer motion, clicks, and scrolling",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a recorded JSONL frame stream
    Replay {
        /// Path to the frame stream
        frames: PathBuf,

        /// Write actions here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Action destination
        #[arg(long, value_enum, default_value_t = SinkKind::Jsonl)]
        sink: SinkKind,

        /// Override the configured screen width
        #[arg(long)]
        screen_width: Option<u32>,

        /// Override the configured screen height
        #[arg(long)]
        screen_height: Option<u32>,
    },

    /// Run a scripted synthetic session (point, tap, hold, scroll)
    Simulate {
        /// Synthetic camera frame rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Also save the generated frames as a replayable stream
        #[arg(long)]
        frames_out: Option<PathBuf>,
    },

    /// Track JSONL frames read from stdin, writing actions to stdout
    Track {
        /// Action destination
        #[arg(long, value_enum, default_value_t = SinkKind::Jsonl)]
        sink: SinkKind,

        /// Start paused
        #[arg(long)]
        paused: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Pointer smoothing on a 1 (none) to 10 (heaviest) scale
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        smoothing_level: Option<u8>,
    },

    /// Print the effective (clamped) configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    gesturemouse_common::logging::init_logging(&LoggingConfig {
        level,
        json: config.logging.json,
    });

    match cli.command {
        Commands::Replay {
            frames,
            output,
            sink,
            screen_width,
            screen_height,
        } => commands::replay::run(&config, frames, output, sink, screen_width, screen_height),
        Commands::Simulate { fps, frames_out } => commands::simulate::run(&config, fps, frames_out),
        Commands::Track { sink, paused } => {
            commands::track::run(config, cli.config, sink, paused).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Init {
                force,
                smoothing_level,
            } => commands::config::init(cli.config, force, smoothing_level),
            ConfigAction::Show => commands::config::show(&config),
        },
        Commands::Check { path } => commands::check::run(path),
    }
}
