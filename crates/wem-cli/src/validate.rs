//! # Validate Subcommand
//!
//! Checks each data file of the plan against its schema. By default the
//! run stops at the first failing pair; `--keep-going` checks every pair
//! and prints a summary.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use wem_schema::{
    SchemaValidationError, ValidationConfig, ValidationPair, ValidationReport, ValidationRunner,
};

/// Arguments for the `wem validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Check every pair even after a failure.
    #[arg(long)]
    pub keep_going: bool,

    /// Replace the plan with explicit pairs (repeatable).
    #[arg(long = "pair", value_name = "LABEL=SCHEMA,DATA")]
    pub pairs: Vec<String>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure.
pub fn run_validate(
    args: &ValidateArgs,
    plan: ValidationConfig,
    out: &mut dyn Write,
) -> Result<u8> {
    let plan = if args.pairs.is_empty() {
        plan
    } else {
        let pairs = args
            .pairs
            .iter()
            .map(|spec| ValidationPair::parse_spec(spec))
            .collect::<Result<Vec<_>, _>>()?;
        plan.with_pairs(pairs)?
    };

    let runner = ValidationRunner::new(plan);

    if args.keep_going {
        let report = runner.run_all(out).context("failed to write progress")?;
        print_report(&report, out)?;
        return Ok(if report.is_success() { 0 } else { 1 });
    }

    match runner.run(out) {
        Ok(()) => {
            tracing::info!(pairs = runner.config().pairs.len(), "all data files valid");
            Ok(0)
        }
        Err(e @ SchemaValidationError::Output(_)) => {
            Err(e).context("failed to write progress")
        }
        Err(e) => {
            writeln!(out, "FAIL [{}]: {e}", e.kind())?;
            Ok(1)
        }
    }
}

fn print_report(report: &ValidationReport, out: &mut dyn Write) -> Result<()> {
    for failure in &report.failures {
        writeln!(
            out,
            "FAIL [{}] {} ({}): {}",
            failure.error.kind(),
            failure.label,
            failure.data.display(),
            failure.error
        )?;
    }
    writeln!(out, "Data files: {}/{} passed", report.passed, report.total)?;
    Ok(())
}
