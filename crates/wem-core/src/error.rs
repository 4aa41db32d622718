//! # Error Types
//!
//! Errors raised while turning validated JSON into the typed model.

use thiserror::Error;

/// Errors produced by the environment data model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A MAC address string is not six hex octets.
    #[error("invalid MAC address: {0:?}")]
    InvalidMac(String),

    /// The document does not have the expected structure.
    #[error("cannot decode {document}: {source}")]
    Decode {
        /// Which document was being decoded (`environments.json`, `AP.json`).
        document: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
