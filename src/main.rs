//! Intraday direction engine - main entry point
//!
//! This binary provides two subcommands:
//! - run: Replay a bar stream and emit trading signals
//! - validate: Check a bar file at the ingestion boundary

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "intraday-direction")]
#[command(about = "Intraday trend-following decision engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a bar stream and emit trading signals
    Run {
        /// Path to bar data CSV (datetime,open,high,low,close)
        #[arg(short, long)]
        data: String,

        /// Path to JSON configuration file (defaults used when omitted)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a bar data file without running the engine
    Validate {
        /// Path to bar data CSV
        #[arg(short, long)]
        data: String,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Run { .. } => "run",
        Commands::Validate { .. } => "validate",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Run { data, config } => commands::run::run(data, config),
        Commands::Validate { data } => commands::validate::run(data),
    }
}
