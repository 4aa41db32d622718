//! # Validation Runner
//!
//! Walks a [`ValidationConfig`] in order. Before each pair it writes a
//! progress line (`validating <label>`) to the supplied sink, then loads the
//! schema, compiles it, loads the data, and validates.
//!
//! [`ValidationRunner::run`] stops at the first failure.
//! [`ValidationRunner::run_all`] checks every pair and returns a report.

use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::{ValidationConfig, ValidationPair};
use crate::validate::{load_json, CompiledSchema, SchemaValidationError};

/// A pair that failed in [`ValidationRunner::run_all`].
#[derive(Debug)]
pub struct PairFailure {
    /// Label of the failing pair.
    pub label: String,
    /// Resolved data path.
    pub data: PathBuf,
    /// What went wrong.
    pub error: SchemaValidationError,
}

/// Summary of a [`ValidationRunner::run_all`] pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Pairs checked.
    pub total: usize,
    /// Pairs that passed.
    pub passed: usize,
    /// Pairs that failed, in plan order.
    pub failures: Vec<PairFailure>,
}

impl ValidationReport {
    /// True when every pair passed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failed pairs.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Runs a validation plan.
#[derive(Debug, Clone)]
pub struct ValidationRunner {
    config: ValidationConfig,
}

impl ValidationRunner {
    /// Create a runner for `config`.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// The plan this runner executes.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Load, compile and validate a single pair.
    ///
    /// The schema is compiled before the data file is read, so a broken
    /// schema is reported even when the data file is missing.
    ///
    /// # Errors
    ///
    /// Any [`SchemaValidationError`] from loading, compiling, or validating.
    pub fn validate_pair(&self, pair: &ValidationPair) -> Result<(), SchemaValidationError> {
        self.load_validated(pair).map(|_| ())
    }

    /// Like [`Self::validate_pair`], but return the parsed data document.
    ///
    /// The returned value is the one that was validated; the data file is
    /// read once.
    ///
    /// # Errors
    ///
    /// Any [`SchemaValidationError`] from loading, compiling, or validating.
    pub fn load_validated(&self, pair: &ValidationPair) -> Result<Value, SchemaValidationError> {
        let schema_path = self.config.resolve(&pair.schema);
        let data_path = self.config.resolve(&pair.data);

        let schema = CompiledSchema::from_file(&schema_path)?;
        let data = load_json(&data_path)?;
        schema.validate(&data)?;

        tracing::info!(
            label = %pair.label,
            data = %data_path.display(),
            "data file conforms to schema"
        );
        Ok(data)
    }

    /// Validate every pair in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first [`SchemaValidationError`] encountered. A failure to write
    /// the progress line is reported as [`SchemaValidationError::Output`].
    pub fn run(&self, out: &mut dyn Write) -> Result<(), SchemaValidationError> {
        for pair in &self.config.pairs {
            progress(out, pair)?;
            self.validate_pair(pair).map_err(|e| {
                tracing::warn!(label = %pair.label, kind = %e.kind(), "validation stopped");
                e
            })?;
        }
        Ok(())
    }

    /// Validate every pair, collecting failures instead of stopping.
    ///
    /// # Errors
    ///
    /// Only a failure to write to `out`; validation failures are recorded in
    /// the report.
    pub fn run_all(&self, out: &mut dyn Write) -> Result<ValidationReport, SchemaValidationError> {
        let mut report = ValidationReport::default();

        for pair in &self.config.pairs {
            progress(out, pair)?;
            report.total += 1;
            match self.validate_pair(pair) {
                Ok(()) => report.passed += 1,
                Err(error) => {
                    tracing::warn!(label = %pair.label, kind = %error.kind(), "pair failed");
                    report.failures.push(PairFailure {
                        label: pair.label.clone(),
                        data: self.config.resolve(&pair.data),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }
}

fn progress(out: &mut dyn Write, pair: &ValidationPair) -> Result<(), SchemaValidationError> {
    writeln!(out, "validating {}", pair.label).map_err(SchemaValidationError::Output)
}
