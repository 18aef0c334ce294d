//! Playtrace CLI — Command-line interface for dataset recording.
//!
//! Usage:
//!   playtrace record [OPTIONS]    Record capture sessions in a loop
//!   playtrace info <PATH>         Show an exported session's metadata
//!   playtrace check               Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "playtrace",
    about = "Gameplay screen + keyboard capture for imitation-learning datasets",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record capture sessions back-to-back until interrupted
    Record {
        /// Output directory for exported sessions
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comma-separated keys to record (e.g. "w,a,s,d")
        #[arg(long)]
        keys: Option<String>,

        /// Key that ends the current session and starts the next
        #[arg(long)]
        finish_key: Option<String>,

        /// Optional key to wait for before the first session begins
        #[arg(long)]
        start_key: Option<String>,

        /// Seconds trimmed from the end of every session
        #[arg(long)]
        discard_tail: Option<f64>,

        /// Offset in seconds added to key timestamps (typically small negative)
        #[arg(long)]
        key_delay: Option<f64>,

        /// Maximum capture rate in frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Use the synthetic frame generator instead of a real grabber
        #[arg(long)]
        synthetic: bool,

        /// Synthetic frame width
        #[arg(long, default_value = "320")]
        width: u32,

        /// Synthetic frame height
        #[arg(long, default_value = "240")]
        height: u32,
    },

    /// Show an exported session's metadata
    Info {
        /// Path to the session directory
        path: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    playtrace_common::logging::init_logging(&playtrace_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    match cli.command {
        Commands::Record {
            output,
            keys,
            finish_key,
            start_key,
            discard_tail,
            key_delay,
            fps,
            synthetic,
            width,
            height,
        } => {
            commands::record::run(commands::record::RecordOpts {
                output,
                keys,
                finish_key,
                start_key,
                discard_tail,
                key_delay,
                fps,
                synthetic,
                width,
                height,
            })
            .await
        }
        Commands::Info { path } => commands::info::run(path),
        Commands::Check => commands::check::run(),
    }
}
