//! sidenav CLI - Documentation sidebar navigation.
//!
//! Provides commands for:
//! - `render`: Render a generated sidebar for a page path and viewport
//! - `check`: Validate a generated sidebar file
//! - `cloud-url`: Resolve the cloud console link for a visitor

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, CloudUrlArgs, RenderArgs};
use output::Output;

/// sidenav - Documentation sidebar navigation.
#[derive(Parser)]
#[command(name = "sidenav", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the sidebar for a page path.
    Render(RenderArgs),
    /// Validate a generated sidebar file.
    Check(CheckArgs),
    /// Resolve the cloud console link.
    CloudUrl(CloudUrlArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Render(args) => args.verbose,
        Commands::CloudUrl(args) => args.verbose,
        Commands::Check(_) => false,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::CloudUrl(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
