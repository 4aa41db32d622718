//! # buildfs Subcommand
//!
//! Runs the `buildfs` step in a [`LocalBuildEnvironment`] with the data
//! directory hooks registered. The step body only lists the files that would
//! be packed into the filesystem image; no image is written.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use wem_hooks::{
    register_buildfs_hooks, BuildEnvironment, LocalBuildEnvironment, BUILDFS_STEP, PROJECT_DATA_DIR,
};

use crate::{list_files, parse_key_value};

/// Arguments for the `wem buildfs` subcommand.
#[derive(Args, Debug, Default)]
pub struct BuildfsArgs {
    /// Set a build environment value (repeatable). Overrides the process
    /// environment.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
}

/// Execute the buildfs subcommand.
///
/// `process_data_dir` is the `PROJECT_DATA_DIR` value inherited from the
/// process environment, if any. Returns exit code 0; step failures are
/// errors.
pub fn run_buildfs(
    args: &BuildfsArgs,
    root: &Path,
    process_data_dir: Option<String>,
    out: &mut dyn Write,
) -> Result<u8> {
    let mut env = LocalBuildEnvironment::new();
    if let Some(dir) = process_data_dir {
        env.set(PROJECT_DATA_DIR, dir);
    }
    for arg in &args.vars {
        let (key, value) = parse_key_value(arg)?;
        env.set(key, value);
    }
    register_buildfs_hooks(&mut env);

    let data_dir = data_dir(&env, root);
    let sources = list_files(&data_dir);
    let target = [root.join(".pio").join("build").join("fs.bin")];

    tracing::info!(
        data_dir = %data_dir.display(),
        files = sources.len(),
        "running buildfs step"
    );

    env.run_step(BUILDFS_STEP, &sources, &target, out, |out| {
        writeln!(
            out,
            "Building FS image from {} ({} file(s))",
            data_dir.display(),
            sources.len()
        )?;
        for file in &sources {
            let shown = file.strip_prefix(&data_dir).unwrap_or(file);
            writeln!(out, "  {}", shown.display())?;
        }
        Ok(())
    })
    .context("buildfs step failed")?;

    Ok(0)
}

/// The directory the step packs: `PROJECT_DATA_DIR` resolved against `root`,
/// or `root/data` when unset.
fn data_dir(env: &LocalBuildEnvironment, root: &Path) -> PathBuf {
    match env.get(PROJECT_DATA_DIR) {
        Some(dir) if !dir.is_empty() => root.join(dir),
        _ => root.join("data"),
    }
}
