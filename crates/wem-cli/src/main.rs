//! # wem CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wem_cli::buildfs::{run_buildfs, BuildfsArgs};
use wem_cli::{finish_output, load_plan};
use wem_cli::resolve::{run_access_point, run_resolve, ResolveArgs};
use wem_cli::validate::{run_validate, ValidateArgs};
use wem_hooks::PROJECT_DATA_DIR;

/// WiFi environment data tool.
///
/// Validates the device data files against their JSON Schemas, shows the
/// station and soft-AP settings a device would apply, and runs the buildfs
/// step locally with its data directory hooks.
#[derive(Parser, Debug)]
#[command(name = "wem", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML validation plan.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root holding `schemas/` and `data/`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every data file against its schema.
    Validate(ValidateArgs),

    /// Print the station settings a device would apply on a network.
    Resolve(ResolveArgs),

    /// Print the soft-AP fallback settings with defaults applied.
    AccessPoint,

    /// Run the buildfs step with its data directory hooks.
    Buildfs(BuildfsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "wem starting");

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = load_plan(cli.config.as_deref(), cli.root.as_deref(), &cwd).and_then(|plan| {
        match cli.command {
            Commands::Validate(args) => run_validate(&args, plan, &mut out),
            Commands::Resolve(args) => run_resolve(&args, &plan, &mut out),
            Commands::AccessPoint => run_access_point(&plan, &mut out),
            Commands::Buildfs(args) => run_buildfs(
                &args,
                &plan.root,
                std::env::var(PROJECT_DATA_DIR).ok(),
                &mut out,
            ),
        }
    });
    let result = finish_output(result, &mut out);

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
