//! # buildfs Hooks
//!
//! Registers a pre-action and a post-action on the `buildfs` step. Both
//! print the `PROJECT_DATA_DIR` value the build environment holds, so the
//! build log shows which data directory went into the filesystem image.
//!
//! A missing value prints [`UNSET_PLACEHOLDER`] and is not an error.
//!
//! Validating the data directory from these hooks is not done: which schema
//! applies to which file found there is not defined.

use std::io::Write;

use crate::environment::{ActionContext, BuildEnvironment, HookError};

/// Name of the filesystem-image build step.
pub const BUILDFS_STEP: &str = "buildfs";

/// Environment key holding the data directory packaged by `buildfs`.
pub const PROJECT_DATA_DIR: &str = "PROJECT_DATA_DIR";

/// Printed in place of an unset `PROJECT_DATA_DIR`.
pub const UNSET_PLACEHOLDER: &str = "<unset>";

/// Attach the `before_buildfs` and `after_buildfs` actions to `env`.
///
/// Registration never fails; the actions run when `env` runs the step.
pub fn register_buildfs_hooks(env: &mut dyn BuildEnvironment) {
    env.add_pre_action(BUILDFS_STEP, Box::new(before_buildfs));
    env.add_post_action(BUILDFS_STEP, Box::new(after_buildfs));
    tracing::debug!(step = BUILDFS_STEP, "registered data directory hooks");
}

fn before_buildfs(ctx: &ActionContext<'_>, out: &mut dyn Write) -> Result<(), HookError> {
    report_data_dir("before_buildfs", ctx, out)
}

fn after_buildfs(ctx: &ActionContext<'_>, out: &mut dyn Write) -> Result<(), HookError> {
    report_data_dir("after_buildfs", ctx, out)
}

fn report_data_dir(
    label: &str,
    ctx: &ActionContext<'_>,
    out: &mut dyn Write,
) -> Result<(), HookError> {
    let data_dir = ctx.env.get(PROJECT_DATA_DIR);
    tracing::trace!(
        label,
        sources = ctx.source.len(),
        targets = ctx.target.len(),
        set = data_dir.is_some(),
        "reporting data directory"
    );
    writeln!(
        out,
        "{label} {}",
        data_dir.as_deref().unwrap_or(UNSET_PLACEHOLDER)
    )?;
    Ok(())
}
