//! # Validation Plan
//!
//! A [`ValidationConfig`] lists which data file is checked against which
//! schema, in order, relative to a project root. The default plan covers
//! the two files a device image carries:
//!
//! | label | schema | data |
//! |---|---|---|
//! | `AP` | `schemas/AP_schema.json` | `data/AP.json` |
//! | `environments` | `schemas/env_schema.json` | `data/environments.json` |
//!
//! Plans can also be read from YAML:
//!
//! ```yaml
//! root: ../firmware
//! pairs:
//!   - label: AP
//!     schema: schemas/AP_schema.json
//!     data: data/AP.json
//! ```
//!
//! A relative `root` in a YAML file is taken relative to the file itself.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that names the project root.
pub const PROJECT_DIR_ENV: &str = "WEM_PROJECT_DIR";

/// Schema for the soft-AP fallback file.
pub const AP_SCHEMA: &str = "schemas/AP_schema.json";
/// Soft-AP fallback data file.
pub const AP_DATA: &str = "data/AP.json";
/// Schema for the known-networks file.
pub const ENV_SCHEMA: &str = "schemas/env_schema.json";
/// Known-networks data file.
pub const ENV_DATA: &str = "data/environments.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Config file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for a plan.
    #[error("invalid config {path}: {reason}")]
    Parse {
        /// Config file path.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The plan has no pairs.
    #[error("validation plan is empty")]
    EmptyPlan,

    /// Two pairs share a label.
    #[error("duplicate pair label: {0}")]
    DuplicateLabel(String),

    /// A `LABEL=SCHEMA,DATA` argument could not be parsed.
    #[error("invalid pair {0:?}: expected LABEL=SCHEMA,DATA")]
    InvalidPairSpec(String),
}

/// One data file and the schema it must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPair {
    /// Name used in progress lines and reports.
    pub label: String,
    /// Schema path, relative to the project root unless absolute.
    pub schema: PathBuf,
    /// Data path, relative to the project root unless absolute.
    pub data: PathBuf,
}

impl ValidationPair {
    /// Create a pair.
    pub fn new(
        label: impl Into<String>,
        schema: impl Into<PathBuf>,
        data: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            schema: schema.into(),
            data: data.into(),
        }
    }

    /// Parse the command-line form `LABEL=SCHEMA,DATA`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPairSpec`] if any part is missing or empty.
    pub fn parse_spec(spec: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidPairSpec(spec.to_string());
        let (label, paths) = spec.split_once('=').ok_or_else(invalid)?;
        let (schema, data) = paths.split_once(',').ok_or_else(invalid)?;
        let (label, schema, data) = (label.trim(), schema.trim(), data.trim());
        if label.is_empty() || schema.is_empty() || data.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(label, schema, data))
    }
}

/// An ordered validation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Directory that relative pair paths are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Pairs, validated in this order.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<ValidationPair>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_pairs() -> Vec<ValidationPair> {
    vec![
        ValidationPair::new("AP", AP_SCHEMA, AP_DATA),
        ValidationPair::new("environments", ENV_SCHEMA, ENV_DATA),
    ]
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            pairs: default_pairs(),
        }
    }
}

impl ValidationConfig {
    /// The default plan rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Parse a plan from YAML text. Relative roots stay as written.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for bad YAML, plus any [`Self::check`] error.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Read a plan from a YAML file. A relative `root` is resolved against
    /// the directory containing the file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`], [`ConfigError::Parse`], or any [`Self::check`]
    /// error.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.check()?;

        if config.root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.root = base.join(&config.root);
        }

        tracing::debug!(
            config = %path.display(),
            root = %config.root.display(),
            pairs = config.pairs.len(),
            "loaded validation plan"
        );
        Ok(config)
    }

    /// Replace the pairs, keeping the root.
    ///
    /// # Errors
    ///
    /// Any [`Self::check`] error for the new pairs.
    pub fn with_pairs(mut self, pairs: Vec<ValidationPair>) -> Result<Self, ConfigError> {
        self.pairs = pairs;
        self.check()?;
        Ok(self)
    }

    /// Reject empty plans and duplicate labels.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyPlan`] or [`ConfigError::DuplicateLabel`].
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.pairs.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }
        let mut seen = HashSet::new();
        for pair in &self.pairs {
            if !seen.insert(pair.label.as_str()) {
                return Err(ConfigError::DuplicateLabel(pair.label.clone()));
            }
        }
        Ok(())
    }

    /// Resolve a pair path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Find a pair by label.
    pub fn pair(&self, label: &str) -> Option<&ValidationPair> {
        self.pairs.iter().find(|p| p.label == label)
    }
}

/// Walk up from `start` to the first directory holding both `schemas/` and
/// `data/`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schemas").is_dir() && dir.join("data").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// The project root named by [`PROJECT_DIR_ENV`], if set and non-empty.
pub fn project_root_from_env() -> Option<PathBuf> {
    std::env::var_os(PROJECT_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
