//! # wem-hooks: Build Step Hooks
//!
//! Firmware builds package `data/` into a filesystem image in a step named
//! `buildfs`. This crate attaches a pre-action and a post-action to that
//! step. Each action reports the `PROJECT_DATA_DIR` the build is using.
//!
//! ## Seams
//!
//! - [`BuildEnvironment`]: what a build system must offer: key lookup and
//!   pre/post action registration per named step. The environment is
//!   always passed in explicitly.
//! - [`register_buildfs_hooks`]: the registration itself. It only
//!   declares the hooks; they run when the build system runs the step.
//! - [`LocalBuildEnvironment`]: an in-process implementation that runs a
//!   step with its hooks, used by the `wem buildfs` command and by tests.

pub mod buildfs;
pub mod environment;

pub use buildfs::{
    register_buildfs_hooks, BUILDFS_STEP, PROJECT_DATA_DIR, UNSET_PLACEHOLDER,
};
pub use environment::{
    ActionContext, BuildAction, BuildEnvironment, HookError, LocalBuildEnvironment, Phase,
};
