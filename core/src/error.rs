//! Error types for schema document operations.

use thiserror::Error;

/// Errors that can occur while loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not well-formed JSON.
    #[error("parse error: {0}")]
    Parse(serde_json::Error),

    /// Well-formed JSON whose shape does not match the schema data model
    /// (e.g. a members list that is not an array).
    #[error("malformed schema: {0}")]
    Malformed(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => Self::Malformed(err.to_string()),
            serde_json::error::Category::Io => Self::IoError(err.into()),
            serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
                Self::Parse(err)
            }
        }
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
