//! ElectionShield CLI: classify frames, aggregate videos, manage policies.
//!
//! Usage:
//!   shield classify <DETECTION>     Score one image from detector output
//!   shield aggregate <VERDICTS>     Fold frame verdicts into a video verdict
//!   shield analyze <CAPTURE>        Re-score a recorded video capture
//!   shield policy show              Print the active scoring policy
//!   shield policy validate <PATH>   Check a policy file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "shield",
    about = "Election incident risk scoring from detector and OCR output",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single image from its detector output
    Classify {
        /// Detector output (JSON, any supported shape)
        detection: PathBuf,

        /// Text extracted from the image
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,

        /// File containing the extracted text
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Scoring policy file (defaults to the configured or built-in policy)
        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// Fold frame verdicts (JSONL, one per line, in frame order) into a video verdict
    Aggregate {
        /// Frame verdicts file
        verdicts: PathBuf,
    },

    /// Re-score a recorded capture (JSONL of per-frame detector/OCR output)
    Analyze {
        /// Capture file
        capture: PathBuf,

        /// Frames analyzed concurrently
        #[arg(long)]
        workers: Option<usize>,

        /// Analyze one frame out of every N decoded frames
        #[arg(long)]
        frame_interval: Option<u32>,

        /// Stop after this many sampled frames
        #[arg(long)]
        max_frames: Option<usize>,

        /// Frame rate used for records without timestamps
        #[arg(long, default_value = "30.0")]
        fps: f64,

        /// Scoring policy file (defaults to the configured or built-in policy)
        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// Inspect or validate scoring policies
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// Print the active policy as JSON
    Show {
        /// Policy file to show instead of the configured one
        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// Validate a policy file
    Validate {
        /// Path to the policy file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shield_common::config::AppConfig::load()?;

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logging.json |= cli.json_logs;
    shield_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Classify {
            detection,
            text,
            text_file,
            policy,
        } => commands::classify::run(&config, detection, text, text_file, policy),
        Commands::Aggregate { verdicts } => commands::aggregate::run(verdicts),
        Commands::Analyze {
            capture,
            workers,
            frame_interval,
            max_frames,
            fps,
            policy,
        } => {
            commands::analyze::run(
                &config,
                capture,
                workers,
                frame_interval,
                max_frames,
                fps,
                policy,
            )
            .await
        }
        Commands::Policy { action } => match action {
            PolicyAction::Show { policy } => commands::policy::show(&config, policy),
            PolicyAction::Validate { path } => commands::policy::validate(path),
        },
    }
}
