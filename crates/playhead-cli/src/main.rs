//! Playhead CLI - Headless Player Driver
//!
//! Features:
//! - Scripted playback sessions against the simulated media resource
//! - Keyboard shortcut reference
//! - Caption file inspection (WebVTT / SRT)
//! - Time formatting and theme CSS variables

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Playhead CLI - Video player core driver
#[derive(Parser)]
#[command(name = "playhead")]
#[command(version)]
#[command(about = "Drive and inspect the playhead playback core", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session and print the emitted events
    Simulate {
        /// Path to a JSON session script
        script: PathBuf,
    },

    /// Show the keyboard shortcut table
    Shortcuts,

    /// Parse a caption file and list its cues
    Captions {
        /// Path to a .vtt or .srt file
        file: PathBuf,

        /// Only show the cue active at this time (seconds)
        #[arg(long)]
        at: Option<f64>,
    },

    /// Format seconds as a time label
    FormatTime {
        /// Seconds to format
        #[arg(required = true)]
        seconds: Vec<f64>,
    },

    /// Print the CSS custom properties for a theme
    Theme {
        /// Theme name (dark, light)
        #[arg(default_value = "dark")]
        name: String,

        /// Selector for the CSS block
        #[arg(long, default_value = ":root")]
        selector: String,
    },
}

#[tokio::main(flavor = "current_thread", start_paused = true)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate { script } => {
            commands::simulate(&script, &cli.format).await?;
        }
        Commands::Shortcuts => {
            commands::shortcuts(&cli.format)?;
        }
        Commands::Captions { file, at } => {
            commands::captions(&file, at, &cli.format)?;
        }
        Commands::FormatTime { seconds } => {
            commands::format_times(&seconds, &cli.format)?;
        }
        Commands::Theme { name, selector } => {
            commands::theme(&name, &selector, &cli.format)?;
        }
    }

    Ok(())
}
