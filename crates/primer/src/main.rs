//! Primer CLI - client primer pipeline.
//!
//! Provides commands for:
//! - `render`: Render a markdown primer into a styled document
//! - `client init`: Lay out a per-client repository

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ClientCommand, RenderArgs};
use output::Output;

/// Primer - client primer pipeline.
#[derive(Parser)]
#[command(name = "primer", version, about)]
struct Cli {
    /// Enable verbose logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown primer into a styled document.
    Render(RenderArgs),
    /// Client repository commands.
    #[command(subcommand)]
    Client(ClientCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Client(cmd) => cmd.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
