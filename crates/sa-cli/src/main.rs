//! # shadow-annotate CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sa_cli::check::{run_check, CheckArgs};
use sa_cli::convert::{run_convert, ConvertArgs};
use sa_cli::validate::{run_validate, ValidateArgs};

/// Shadow annotations toolchain.
///
/// Validates and converts data documents against shadow trees of rule
/// annotations.
#[derive(Parser, Debug)]
#[command(name = "shadow-annotate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to the engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a data document and report findings.
    Validate(ValidateArgs),

    /// Run the converters of a shadow tree over a data document.
    Convert(ConvertArgs),

    /// Parse and lint a shadow tree.
    CheckShadow(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, config),
        Commands::Convert(args) => run_convert(args, config),
        Commands::CheckShadow(args) => run_check(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
