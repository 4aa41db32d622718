//! # wem-schema: Data File Validation
//!
//! Checks the JSON data files shipped in a device filesystem image against
//! their JSON Schema (Draft 2020-12) definitions, with string formats such
//! as `ipv4` and `hostname` enforced.
//!
//! ## Layers
//!
//! - [`validate`]: loading JSON from disk, compiling one schema into a
//!   [`CompiledSchema`], and turning `jsonschema` errors into structured
//!   [`Violation`]s.
//! - [`config`]: the validation plan: an ordered list of
//!   [`ValidationPair`]s resolved against a project root, loadable from a
//!   YAML file.
//! - [`runner`]: [`ValidationRunner`], which walks a plan and writes a
//!   progress line before each pair.
//!
//! ## Error Policy
//!
//! Nothing in this crate terminates the process. Every failure comes back
//! as a [`SchemaValidationError`] and the caller decides what to do with it.

pub mod config;
pub mod runner;
pub mod validate;

pub use config::{ConfigError, ValidationConfig, ValidationPair};
pub use runner::{PairFailure, ValidationReport, ValidationRunner};
pub use validate::{
    load_json, CompiledSchema, ErrorKind, SchemaValidationError, ValidationViolations, Violation,
};
