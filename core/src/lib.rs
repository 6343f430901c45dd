//! Core schema types and document lookup for WebExtension API schemas.
//!
//! This crate defines the data model of a unified schema document, the JSON
//! description of a host platform's extension API surface:
//!
//! - [`SchemaDocument`]: one release's schemas, keyed by source file, with
//!   case- and separator-insensitive lookup.
//! - [`NamespaceDefinition`]: a dotted namespace with its events,
//!   functions, properties and types.
//! - [`FunctionMember`], [`PropertyMember`], [`TypeMember`]: the members a
//!   namespace declares.
//! - [`MemberKind`]: the shape a property or type member synthesizes to,
//!   decided once by [`Member::classify`].
//!
//! Validation ([`validate_document`]) reports structural defects such as
//! definitions without a namespace.
//!
//! # Example
//!
//! ```
//! use webext_schema_core::*;
//!
//! let doc = SchemaDocument::parse(r#"{
//!     "storage.json": [{
//!         "namespace": "storage",
//!         "properties": { "local": { "$ref": "StorageArea" } },
//!         "types": [{ "id": "StorageArea", "type": "object" }]
//!     }]
//! }"#).unwrap();
//!
//! let defs = doc.get("storage").unwrap();
//! let local = &defs[0].properties["local"];
//! assert_eq!(local.classify(), MemberKind::Reference("StorageArea"));
//! assert!(validate_document(&doc).is_empty());
//! ```

mod document;
mod error;
mod types;
mod validate;

pub use document::{SchemaDocument, fold_key};
pub use error::{Result, SchemaError};
pub use types::*;
pub use validate::{ValidationError, is_valid_namespace, validate_definition, validate_document};
