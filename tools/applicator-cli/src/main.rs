//! Applicator CLI: apply face capture takes to scene targets.
//!
//! Usage:
//!   applicator apply [OPTIONS]       Apply a capture take and write the keys
//!   applicator validate [OPTIONS]    Run pre-flight checks only
//!   applicator neutral <FILE>        Show the neutral profile of a calibration take
//!   applicator info <FILE>           Show capture take information

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use applicator_common::config::AppConfig;

mod commands;

use commands::RunArgs;

#[derive(Parser)]
#[command(
    name = "applicator",
    about = "Apply ARKit face capture data to scene animation channels",
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
    /// Apply a capture take to a scene target
    Apply {
        #[command(flatten)]
        run: RunArgs,

        /// Keyframe log output path (defaults to <capture>.keys.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plan the keys and print a summary without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check scene, files and take without applying anything
    Validate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Compute the neutral profile of a calibration take
    Neutral {
        /// Path to the calibration take
        path: PathBuf,
    },

    /// Show capture take information
    Info {
        /// Path to the capture take
        path: PathBuf,

        /// Scene frame rate to estimate output frames for
        #[arg(long, default_value = "30")]
        fps: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    applicator_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Apply {
            run,
            output,
            dry_run,
            json,
        } => commands::apply::run(run, &config.defaults, output, dry_run, json),
        Commands::Validate { run } => commands::validate::run(run, &config.defaults),
        Commands::Neutral { path } => commands::neutral::run(path),
        Commands::Info { path, fps } => commands::info::run(path, fps),
    }
}
