//! Recording stub trees synthesized from WebExtension API schemas.
//!
//! Given a [`SchemaDocument`], this crate builds a [`MockTree`]: a graph of
//! objects mirroring the declared API surface in which every function is a
//! recording [`Stub`] and every event exposes `addListener`, `hasListener`
//! and `removeListener` stubs.
//!
//! A build runs in two phases:
//!
//! 1. [`NamespaceBuilder`] walks each `(file, definition)` pair, keeps the
//!    definitions that belong to their file, and hands their members to the
//!    [`MemberSynthesizer`]. `$import` and `$ref` are queued, not followed.
//! 2. [`CrossReferenceResolver`] drains the queues against the finished tree,
//!    copying the target's members onto each placeholder. Nested objects are
//!    shared by reference, so a stub reached through an import is the same
//!    stub as the one at its declaration site.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use webext_schema_core::SchemaDocument;
//!
//! let doc = SchemaDocument::parse(r#"{
//!     "storage.json": [{
//!         "namespace": "storage",
//!         "properties": { "local": { "$ref": "StorageArea" } },
//!         "types": [{
//!             "id": "StorageArea",
//!             "type": "object",
//!             "functions": [{ "name": "get", "type": "function" }]
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let tree = webext_schema_mock::synthesize(&doc).unwrap();
//!
//! let get = tree.stub("storage.local.get").unwrap();
//! get.returns(json!({ "key": "value" }));
//! assert_eq!(get.call(&[json!("key")]).unwrap(), json!({ "key": "value" }));
//! assert!(get.ptr_eq(&tree.stub("storage.StorageArea.get").unwrap()));
//!
//! tree.sandbox().reset();
//! assert!(!get.called());
//! ```

mod builder;
mod config;
mod error;
mod reference;
mod resolve;
mod stub;
mod synthesize;
mod tree;

pub use builder::NamespaceBuilder;
pub use config::{CONFIG_VERSION, Channel, DEFAULT_ALIASES, MockConfig};
pub use error::{MockError, Result};
pub use reference::{Reference, ReferenceKind, ReferenceQueue, ReferenceQueues};
pub use resolve::{CrossReferenceResolver, ResolveStats};
pub use stub::{Sandbox, Stub, StubError};
pub use synthesize::MemberSynthesizer;
pub use tree::{
    CIRCULAR_MARKER, EVENT_LISTENER_METHODS, EventStub, MockNode, MockTree, NodeId, STUB_MARKER,
};

use webext_schema_core::SchemaDocument;

/// Builds a mock tree from `document` with the default configuration.
///
/// # Errors
///
/// Returns [`MockError::MalformedSchema`] if any definition lacks a valid
/// namespace.
pub fn synthesize(document: &SchemaDocument) -> Result<MockTree> {
    NamespaceBuilder::new(document).build()
}

/// Builds a mock tree from `document` with an explicit configuration.
pub fn synthesize_with(document: &SchemaDocument, config: &MockConfig) -> Result<MockTree> {
    NamespaceBuilder::new(document)
        .with_config(config.clone())
        .build()
}
