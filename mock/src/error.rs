//! Error types for mock synthesis.
//!
//! Structural errors abort the whole build; there is no partial tree.
//! Unresolved references are not errors at all.

use thiserror::Error;

/// Errors that can occur while building a mock tree.
#[derive(Debug, Error)]
pub enum MockError {
    /// The schema itself is invalid (e.g. a definition without a namespace).
    #[error("malformed schema in {file}: {reason}")]
    MalformedSchema {
        /// File key of the offending definition
        file: String,
        /// What is wrong with it
        reason: String,
    },

    /// A synthesis operation was invoked with an argument of the wrong shape.
    #[error("expected {expected} but got {found}")]
    ArgumentType {
        /// Expected shape
        expected: &'static str,
        /// Shape actually received
        found: String,
    },

    /// A release channel name outside the known set.
    #[error("unknown release channel {0:?} (expected beta, central, release, esr or mail)")]
    InvalidChannel(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`MockError`].
pub type Result<T> = std::result::Result<T, MockError>;
