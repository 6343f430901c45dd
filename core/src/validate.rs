//! Document validation.
//!
//! Validates structural invariants of a schema document, catching defects
//! such as definitions without a namespace, empty namespace segments, and
//! unnamed functions or events before they reach synthesis.
//!
//! # Examples
//!
//! ```
//! use webext_schema_core::*;
//!
//! let doc = SchemaDocument::from_fragments([
//!     ("tabs.json", vec![NamespaceDefinition::new("tabs")]),
//! ]);
//! assert!(validate_document(&doc).is_empty());
//!
//! // Invalid: definition without a namespace
//! let bad = SchemaDocument::from_fragments([
//!     ("tabs.json", vec![NamespaceDefinition::default()]),
//! ]);
//! assert!(!validate_document(&bad).is_empty());
//! ```

use thiserror::Error;

use crate::{FunctionMember, NamespaceDefinition, SchemaDocument};

/// Document validation errors.
///
/// Each variant describes a specific structural problem. The `Display` impl
/// provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A definition has no `namespace` field.
    #[error("definition #{index} in {file} has no namespace")]
    MissingNamespace {
        /// File key
        file: String,
        /// Position of the definition within the file
        index: usize,
    },
    /// A namespace is empty or has an empty dotted segment (e.g. `a..b`).
    #[error("invalid namespace in {file}: {namespace:?}")]
    InvalidNamespace {
        /// File key
        file: String,
        /// Offending namespace
        namespace: String,
    },
    /// A function-typed function has no name.
    #[error("unnamed function in namespace {0}")]
    UnnamedFunction(String),
    /// A function-typed event has no name.
    #[error("unnamed event in namespace {0}")]
    UnnamedEvent(String),
}

/// Validates every definition in a document.
///
/// Unlike synthesis, which stops at the first defect, validation reports all
/// problems found.
pub fn validate_document(document: &SchemaDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (file, defs) in document.entries() {
        for (index, def) in defs.iter().enumerate() {
            errors.extend(validate_definition(file, index, def));
        }
    }

    errors
}

/// Validates one definition of the given file.
pub fn validate_definition(
    file: &str,
    index: usize,
    def: &NamespaceDefinition,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(namespace) = def.namespace.as_deref() else {
        errors.push(ValidationError::MissingNamespace {
            file: file.to_string(),
            index,
        });
        return errors;
    };

    if !is_valid_namespace(namespace) {
        errors.push(ValidationError::InvalidNamespace {
            file: file.to_string(),
            namespace: namespace.to_string(),
        });
        return errors;
    }

    if def.functions.iter().any(is_unnamed_function) {
        errors.push(ValidationError::UnnamedFunction(namespace.to_string()));
    }
    if def.events.iter().any(is_unnamed_function) {
        errors.push(ValidationError::UnnamedEvent(namespace.to_string()));
    }

    errors
}

/// Returns `true` if every dotted segment of `namespace` is non-empty.
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty() && namespace.split('.').all(|segment| !segment.is_empty())
}

fn is_unnamed_function(member: &FunctionMember) -> bool {
    member.kind.as_deref() == Some(crate::FUNCTION_TYPE)
        && member.name.as_deref().is_none_or(str::is_empty)
}
