//! # Resolve and Access-Point Subcommands
//!
//! Show what a device would configure from the data files. Each command
//! first validates the file it reads, so the output never reflects data
//! that the schema rejects.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use wem_core::{AccessPointConfig, CoreError, Environments, MacAddress};
use wem_schema::{ValidationConfig, ValidationPair, ValidationRunner};

/// Plan label of the known-networks pair.
pub const ENVIRONMENTS_LABEL: &str = "environments";

/// Plan label of the soft-AP pair.
pub const ACCESS_POINT_LABEL: &str = "AP";

/// Arguments for the `wem resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// SSID the device joined.
    #[arg(long)]
    pub ssid: String,

    /// Hardware address of the device (`AA:BB:CC:DD:EE:FF`).
    #[arg(long)]
    pub mac: String,
}

/// Execute the resolve subcommand.
///
/// Returns exit code: 0 when the SSID is known, 1 when it is not or the
/// data file fails validation or decoding.
pub fn run_resolve(args: &ResolveArgs, plan: &ValidationConfig, out: &mut dyn Write) -> Result<u8> {
    let mac = MacAddress::parse(&args.mac).context("invalid --mac")?;

    let Some(data) = validated_document(plan, ENVIRONMENTS_LABEL, out)? else {
        return Ok(1);
    };
    let environments = match Environments::from_value(data) {
        Ok(envs) => envs,
        Err(e) => return report_decode_failure(&e, out),
    };

    match environments.resolve(&args.ssid, mac) {
        Some(station) => {
            print_json(&station, out)?;
            Ok(0)
        }
        None => {
            writeln!(
                out,
                "unknown SSID {:?} ({} known network(s))",
                args.ssid,
                environments.len()
            )?;
            Ok(1)
        }
    }
}

/// Execute the access-point subcommand.
///
/// Returns exit code: 0 on success, 1 if `AP.json` fails validation.
pub fn run_access_point(plan: &ValidationConfig, out: &mut dyn Write) -> Result<u8> {
    let Some(data) = validated_document(plan, ACCESS_POINT_LABEL, out)? else {
        return Ok(1);
    };
    let ap = match AccessPointConfig::from_value(data) {
        Ok(ap) => ap,
        Err(e) => return report_decode_failure(&e, out),
    };
    print_json(&ap, out)?;
    Ok(0)
}

/// Validate the pair labelled `label` and return its parsed data, or `None`
/// after printing the failure.
fn validated_document(
    plan: &ValidationConfig,
    label: &str,
    out: &mut dyn Write,
) -> Result<Option<serde_json::Value>> {
    let pair: &ValidationPair = plan
        .pair(label)
        .with_context(|| format!("validation plan has no {label:?} pair"))?;

    let runner = ValidationRunner::new(plan.clone());
    match runner.load_validated(pair) {
        Ok(data) => Ok(Some(data)),
        Err(e) => {
            writeln!(out, "FAIL [{}]: {e}", e.kind())?;
            Ok(None)
        }
    }
}

/// Report a document that passed its schema but does not fit the model.
fn report_decode_failure(e: &CoreError, out: &mut dyn Write) -> Result<u8> {
    writeln!(out, "FAIL [decode]: {e}")?;
    Ok(1)
}

fn print_json<T: Serialize>(value: &T, out: &mut dyn Write) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    writeln!(out, "{text}")?;
    Ok(())
}
