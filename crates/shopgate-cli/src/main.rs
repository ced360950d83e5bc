//! # shopgate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shopgate_cli::decide::{run_decide, DecideArgs};
use shopgate_cli::return_path::{run_return_path, ReturnPathArgs};
use shopgate_cli::routes::{run_routes, RoutesArgs};

/// Storefront access gate inspection tool.
///
/// Prints the route tables the gateway enforces and dry-runs gate decisions
/// without contacting a session provider.
#[derive(Parser, Debug)]
#[command(name = "shopgate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the protected, auth-only, and asset tables.
    Routes(RoutesArgs),

    /// Show what the gate does with a path.
    Decide(DecideArgs),

    /// Show where a `redirect` parameter sends the visitor after login.
    ReturnPath(ReturnPathArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Routes(args) => run_routes(&args),
        Commands::Decide(args) => run_decide(&args),
        Commands::ReturnPath(args) => run_return_path(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
