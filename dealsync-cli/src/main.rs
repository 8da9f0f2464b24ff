//! dealsync — push CRM deals into the brokerage-accounting service.
//!
//! # Usage
//!
//! ```text
//! dealsync sync <deal.json> --user <email> [--deal-type ..] [--deal-sub-type ..]
//!               [--lead-source ..] [--property-type ..] [--sale-status ..]
//! dealsync classify <deal.json>
//! dealsync mapping list [--json]
//! dealsync mapping show <deal-id>
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{classify::ClassifyArgs, mapping::MappingCommand, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dealsync",
    version,
    about = "Synchronize CRM deals with the brokerage-accounting service",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the remote deal for a deal snapshot.
    Sync(SyncArgs),

    /// Show how each participant of a deal snapshot would be classified.
    Classify(ClassifyArgs),

    /// Inspect the local-to-remote deal mappings.
    Mapping {
        #[command(subcommand)]
        command: MappingCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Classify(args) => args.run(),
        Commands::Mapping { command } => commands::mapping::run(command),
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
