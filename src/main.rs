//! Entry point: parses CLI arguments, validates them into a `RunConfig`,
//! runs the interpolation pipeline, prints the run summary, and maps the
//! run's terminal state to the process exit code contract (spec §6, §12).

mod aggregate;
mod cli;
mod config;
mod error;
mod idw;
mod io;
mod models;
mod pipeline;
mod representative;
mod schedule;
mod spatial;
mod temporal;

use clap::Parser;
use colored::*;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Args;
use error::exit_code_for;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = Args::parse();
    let input_path = args.input.clone();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "configuration error:".red().bold(), e);
            return exit_code_for(&Err(e));
        },
    };

    let _log_guard = init_logging(&input_path);
    info!(input = %config.input_path.display(), "starting run");

    match pipeline::run(&config) {
        Ok(summary) => {
            cli::print_summary(&summary);
            info!(
                primary_output = %summary.primary_output_path.display(),
                distance_output = %summary.distance_output_path.display(),
                full_success = summary.is_full_success(),
                "run complete"
            );
            exit_code_for(&Ok(summary.is_full_success()))
        },
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("{} {}", "error:".red().bold(), e);
            exit_code_for(&Err(e))
        },
    }
}

/// Sets up structured logging: a daily-rolling file sink whose filename
/// mirrors the input basename (spec §6.2's "log file path mirrors input
/// basename with a timestamped suffix"), and a console layer kept off by
/// default — the human-facing summary is printed separately via
/// `cli::print_summary`, not interleaved with structured trace events.
fn init_logging(input_path: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let basename = input_path.file_stem().and_then(|s| s.to_str()).unwrap_or("run");
    let file_appender = tracing_appender::rolling::daily("logs", format!("{basename}.log"));
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let file_layer = fmt::layer().with_writer(non_blocking_appender).with_ansi(false).json();
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true).with_filter(EnvFilter::new("off"));

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(console_layer).init();

    guard
}
