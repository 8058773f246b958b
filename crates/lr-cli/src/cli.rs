//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Learn/rest interval timer.
///
/// Alternates focused learning sessions with rest breaks and keeps per-day
/// totals. Rest can follow a video instead of a fixed countdown.
#[derive(Debug, Parser)]
#[command(name = "lr", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a learning countdown. Type `stop` or press Ctrl-C to end early.
    Learn {
        /// Session length in whole minutes (defaults to the configured value).
        #[arg(short, long)]
        minutes: Option<i64>,
    },

    /// Run a rest break, either a countdown or a video.
    Rest {
        /// Break length in whole minutes (defaults to the configured value).
        #[arg(short, long, conflicts_with = "video")]
        minutes: Option<i64>,

        /// Video ID or link; rest lasts as long as the video plays.
        #[arg(long, requires = "duration")]
        video: Option<String>,

        /// Video length in seconds, used by the terminal player.
        #[arg(long, requires = "video")]
        duration: Option<u32>,

        /// Open the video's watch page in the browser.
        #[arg(long, requires = "video")]
        open: bool,
    },

    /// Show today's learning and rest totals.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Zero today's totals.
    Reset,

    /// Resolve a video link or ID to its canonical ID.
    Resolve {
        /// Video ID or link.
        input: String,
    },
}
