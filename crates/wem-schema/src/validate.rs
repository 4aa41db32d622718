//! # Schema Validation
//!
//! Loading of schema and data documents, and validation of one data
//! document against one schema (Draft 2020-12).
//!
//! ## Format checking
//!
//! Draft 2020-12 treats `format` as an annotation unless the validator opts
//! in. Every [`CompiledSchema`] opts in, so `"format": "ipv4"` rejects
//! `"999.1.1.1"` instead of silently accepting it.
//!
//! ## Error kinds
//!
//! Callers that only care about the broad category (missing file, broken
//! JSON, non-conforming data) can match on [`SchemaValidationError::kind`]
//! instead of the individual variants.

use std::fmt;
use std::io;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by loading and validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The schema or data file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },

    /// The file exists but is not valid JSON.
    #[error("malformed JSON in {path}: {reason}")]
    MalformedJson {
        /// Path of the offending file.
        path: String,
        /// Parser message, including line and column.
        reason: String,
    },

    /// Any other failure reading a file.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Progress output could not be written.
    #[error("cannot write progress output: {0}")]
    Output(#[source] io::Error),

    /// The schema document is not a usable JSON Schema.
    #[error("invalid schema {schema}: {reason}")]
    SchemaCompileError {
        /// Schema name or path.
        schema: String,
        /// Reason reported by the schema compiler.
        reason: String,
    },

    /// The data document does not conform to the schema.
    #[error("{} violation(s) of {schema}:\n{violations}", .violations.len())]
    ValidationFailed {
        /// Schema name or path.
        schema: String,
        /// Every violation found.
        violations: ValidationViolations,
    },
}

/// Broad category of a [`SchemaValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path does not exist.
    FileNotFound,
    /// A file is not valid JSON.
    MalformedJson,
    /// A file could not be read for another reason.
    Io,
    /// A schema could not be compiled.
    InvalidSchema,
    /// Data does not conform to its schema.
    SchemaViolation,
}

impl ErrorKind {
    /// Stable lower-case name, used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileNotFound => "file-not-found",
            Self::MalformedJson => "malformed-json",
            Self::Io => "io",
            Self::InvalidSchema => "invalid-schema",
            Self::SchemaViolation => "schema-violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SchemaValidationError {
    /// The broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::FileNotFound,
            Self::MalformedJson { .. } => ErrorKind::MalformedJson,
            Self::Io { .. } | Self::Output(_) => ErrorKind::Io,
            Self::SchemaCompileError { .. } => ErrorKind::InvalidSchema,
            Self::ValidationFailed { .. } => ErrorKind::SchemaViolation,
        }
    }

    /// The individual violations, if this is a schema violation.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the data document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty collection of violations from one validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always false for violations produced by [`CompiledSchema::validate`].
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations, in the order the validator reported them.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation points at `instance_path`.
    pub fn touches(&self, instance_path: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.instance_path == instance_path)
    }

    /// Consume and return the inner list.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and parse a JSON file.
///
/// # Errors
///
/// - [`SchemaValidationError::NotFound`] if `path` does not exist.
/// - [`SchemaValidationError::MalformedJson`] if the contents are not UTF-8
///   JSON.
/// - [`SchemaValidationError::Io`] for any other read failure.
pub fn load_json(path: &Path) -> Result<Value, SchemaValidationError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SchemaValidationError::NotFound {
            path: path.display().to_string(),
        },
        _ => SchemaValidationError::Io {
            path: path.display().to_string(),
            source: e,
        },
    })?;

    serde_json::from_slice(&bytes).map_err(|e| SchemaValidationError::MalformedJson {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CompiledSchema
// ---------------------------------------------------------------------------

/// A schema bound to a compiled `jsonschema` validator.
///
/// The only way to get one is [`CompiledSchema::compile`], so a validator
/// always carries the schema it was built from.
pub struct CompiledSchema {
    name: String,
    validator: Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Compile `schema` as Draft 2020-12 with format assertions enabled.
    ///
    /// `name` only labels errors; it is usually the schema's path.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaCompileError`] if `schema` is
    /// not a valid JSON Schema.
    pub fn compile(name: impl Into<String>, schema: &Value) -> Result<Self, SchemaValidationError> {
        let name = name.into();
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| SchemaValidationError::SchemaCompileError {
                schema: name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(schema = %name, "compiled schema");
        Ok(Self { name, validator })
    }

    /// Load a schema file and compile it, labelled with its path.
    ///
    /// # Errors
    ///
    /// Any error of [`load_json`] or [`CompiledSchema::compile`].
    pub fn from_file(path: &Path) -> Result<Self, SchemaValidationError> {
        let schema = load_json(path)?;
        Self::compile(path.display().to_string(), &schema)
    }

    /// The label this schema was compiled with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cheap yes/no check.
    pub fn is_valid(&self, data: &Value) -> bool {
        self.validator.is_valid(data)
    }

    /// Validate `data`, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::ValidationFailed`] if `data` does
    /// not conform.
    pub fn validate(&self, data: &Value) -> Result<(), SchemaValidationError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(data)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                schema = %self.name,
                count = violations.len(),
                "document failed validation"
            );
            Err(SchemaValidationError::ValidationFailed {
                schema: self.name.clone(),
                violations: ValidationViolations { violations },
            })
        }
    }
}
