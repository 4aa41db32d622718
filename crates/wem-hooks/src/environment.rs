//! # Build Environment
//!
//! The interface a build system exposes to hooks, plus
//! [`LocalBuildEnvironment`], which runs named steps in-process.
//!
//! ## Ordering
//!
//! For one execution of a step, [`LocalBuildEnvironment::run_step`] runs
//! every pre-action in registration order, then the step body, then every
//! post-action in registration order. Each runs exactly once. The first
//! error aborts the step; later actions do not run.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

/// When an action runs relative to its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the step body.
    Pre,
    /// After the step body.
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => f.write_str("pre"),
            Self::Post => f.write_str("post"),
        }
    }
}

/// Errors raised while running a step.
#[derive(Debug, Error)]
pub enum HookError {
    /// Writing to the output sink failed.
    #[error("cannot write step output: {0}")]
    Output(#[from] io::Error),

    /// A registered action failed.
    #[error("{phase}-action for step {step} failed: {reason}")]
    Action {
        /// Step name.
        step: String,
        /// Which side of the step.
        phase: Phase,
        /// Failure description.
        reason: String,
    },

    /// The step body failed.
    #[error("step {step} failed: {reason}")]
    Step {
        /// Step name.
        step: String,
        /// Failure description.
        reason: String,
    },
}

/// Arguments handed to an action: the step's sources and targets, and the
/// environment running it.
pub struct ActionContext<'a> {
    /// Step inputs.
    pub source: &'a [PathBuf],
    /// Step outputs.
    pub target: &'a [PathBuf],
    /// The environment running the step.
    pub env: &'a dyn BuildEnvironment,
}

/// A callback attached to a step. Output goes to the supplied sink.
pub type BuildAction = Box<dyn Fn(&ActionContext<'_>, &mut dyn Write) -> Result<(), HookError>>;

/// What a build system exposes to hooks.
pub trait BuildEnvironment {
    /// Look up a configuration value.
    fn get(&self, key: &str) -> Option<String>;

    /// Run `action` immediately before `step`.
    fn add_pre_action(&mut self, step: &str, action: BuildAction);

    /// Run `action` immediately after `step`.
    fn add_post_action(&mut self, step: &str, action: BuildAction);
}

/// In-process build environment: a key/value map plus per-step actions.
#[derive(Default)]
pub struct LocalBuildEnvironment {
    vars: BTreeMap<String, String>,
    pre: HashMap<String, Vec<BuildAction>>,
    post: HashMap<String, Vec<BuildAction>>,
}

impl fmt::Debug for LocalBuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBuildEnvironment")
            .field("vars", &self.vars)
            .field("pre_steps", &self.pre.keys().collect::<Vec<_>>())
            .field("post_steps", &self.post.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LocalBuildEnvironment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Builder form of [`Self::set`].
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Number of actions registered for `step` in `phase`.
    pub fn action_count(&self, step: &str, phase: Phase) -> usize {
        let table = match phase {
            Phase::Pre => &self.pre,
            Phase::Post => &self.post,
        };
        table.get(step).map_or(0, Vec::len)
    }

    /// Run `step`: pre-actions, then `body`, then post-actions, all writing
    /// to `out`.
    ///
    /// # Errors
    ///
    /// The first [`HookError`] from an action or the body.
    pub fn run_step<F>(
        &self,
        step: &str,
        source: &[PathBuf],
        target: &[PathBuf],
        out: &mut dyn Write,
        body: F,
    ) -> Result<(), HookError>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), HookError>,
    {
        let ctx = ActionContext {
            source,
            target,
            env: self,
        };

        tracing::debug!(
            step,
            pre = self.action_count(step, Phase::Pre),
            post = self.action_count(step, Phase::Post),
            "running build step"
        );

        self.run_phase(step, Phase::Pre, &ctx, out)?;
        body(&mut *out)?;
        self.run_phase(step, Phase::Post, &ctx, out)?;
        Ok(())
    }

    fn run_phase(
        &self,
        step: &str,
        phase: Phase,
        ctx: &ActionContext<'_>,
        out: &mut dyn Write,
    ) -> Result<(), HookError> {
        let table = match phase {
            Phase::Pre => &self.pre,
            Phase::Post => &self.post,
        };
        for action in table.get(step).into_iter().flatten() {
            action(ctx, &mut *out)?;
        }
        Ok(())
    }
}

impl BuildEnvironment for LocalBuildEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn add_pre_action(&mut self, step: &str, action: BuildAction) {
        self.pre.entry(step.to_string()).or_default().push(action);
    }

    fn add_post_action(&mut self, step: &str, action: BuildAction) {
        self.post.entry(step.to_string()).or_default().push(action);
    }
}
