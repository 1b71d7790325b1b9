//! `nebula` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the HTTP control plane in-process.
//! - `validate` — parse and normalize a workflow graph JSON file.
//! - `run`      — execute a workflow graph JSON file start-to-finish
//!   against a throwaway in-memory store and print the final execution.

mod commands;

use clap::{Parser, Subcommand};
use nebula_log::LogConfig;

#[derive(Parser)]
#[command(name = "nebula", about = "Nebula workflow engine CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP control plane.
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Validate a workflow graph JSON file without running it.
    Validate {
        /// Path to the workflow graph JSON file.
        path: std::path::PathBuf,
    },
    /// Run a workflow graph JSON file to completion (or first pause).
    Run {
        /// Path to the workflow graph JSON file.
        path: std::path::PathBuf,
        /// Path to a JSON file supplying the trigger input, if any.
        #[arg(long)]
        input: Option<std::path::PathBuf>,
        /// Mark the created execution as debug-mode (breakpoints on the
        /// graph's own edges are what actually pause a run).
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nebula_log::init(&LogConfig::default()).expect("default log config is always valid");

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { bind } => commands::serve::run(bind).await,
        Command::Validate { path } => commands::validate::run(&path),
        Command::Run { path, input, debug } => commands::run::run(&path, input.as_deref(), debug).await,
    }
}
