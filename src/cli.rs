use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffnorm")]
#[command(about = "Batch HEVC/AAC normalizer for video trees", long_about = None)]
pub struct Cli {
    /// Input directory to scan for source videos (overrides config)
    #[arg(long, value_name = "DIRECTORY")]
    pub input: Option<PathBuf>,

    /// Output root for normalized files (overrides config)
    #[arg(long, value_name = "DIRECTORY")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check if ffmpeg and ffprobe are installed
    CheckFfmpeg,

    /// Probe a video file and show the derived encoding decision
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// Scan the input tree and list candidate files without encoding
    Scan {
        /// Directory to scan (defaults to the configured input directory)
        directory: Option<PathBuf>,
    },

    /// Show ffmpeg commands without executing (dry run)
    DryRun {
        /// Directory to scan (defaults to the configured input directory)
        directory: Option<PathBuf>,
    },

    /// Process the whole input tree (default when no subcommand is given)
    Run,

    /// Show config status and location, or create default config if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
