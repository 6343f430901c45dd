//! Namespace selection and tree construction.
//!
//! [`NamespaceBuilder`] walks every `(file, definition)` pair of a
//! [`SchemaDocument`], decides whether the definition belongs in the tree,
//! materializes its dotted namespace path and hands the leaf container to the
//! [`MemberSynthesizer`]. References are resolved only after the whole
//! document has been walked, so definition order never matters.

use tracing::{debug, info};
use webext_schema_core::{NamespaceDefinition, SchemaDocument, fold_key, is_valid_namespace};

use crate::config::MockConfig;
use crate::error::{MockError, Result};
use crate::reference::{Reference, ReferenceKind, ReferenceQueues};
use crate::resolve::CrossReferenceResolver;
use crate::synthesize::MemberSynthesizer;
use crate::tree::{MockTree, NodeId};

/// Builds a [`MockTree`] from a borrowed [`SchemaDocument`].
///
/// Each [`build`](Self::build) starts from an empty tree and fresh reference
/// queues; nothing is shared between builds except the read-only document.
///
/// # Examples
///
/// ```
/// use webext_schema_core::SchemaDocument;
/// use webext_schema_mock::{MockConfig, NamespaceBuilder};
///
/// let doc = SchemaDocument::parse(r#"{
///     "menus.json": [{
///         "namespace": "menus",
///         "functions": [{ "name": "create", "type": "function" }]
///     }]
/// }"#).unwrap();
///
/// let tree = NamespaceBuilder::new(&doc)
///     .with_config(MockConfig::default())
///     .build()
///     .unwrap();
/// assert!(tree.stub("menus.create").is_some());
/// ```
pub struct NamespaceBuilder<'d> {
    document: &'d SchemaDocument,
    config: MockConfig,
}

impl<'d> NamespaceBuilder<'d> {
    /// Creates a builder with the default configuration.
    pub fn new(document: &'d SchemaDocument) -> Self {
        Self {
            document,
            config: MockConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: MockConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Returns `true` if a definition from `file` belongs in the tree.
    ///
    /// A definition is included when its folded namespace equals the folded
    /// file key or either is a prefix of the other, when the namespace is on
    /// the alias allow-list, or when it declares an `$import`.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::MalformedSchema`] if the definition has no valid
    /// namespace.
    pub fn includes(&self, file: &str, def: &NamespaceDefinition) -> Result<bool> {
        let namespace = namespace_of(file, def)?;
        let file_key = fold_key(file);
        let item_key = fold_key(namespace);
        Ok(file_key == item_key
            || file_key.starts_with(&item_key)
            || item_key.starts_with(&file_key)
            || self.config.is_alias(namespace)
            || def.import.is_some())
    }

    /// Builds the tree and resolves every queued reference.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::MalformedSchema`] for the first definition without
    /// a valid namespace. No partial tree is returned.
    pub fn build(&self) -> Result<MockTree> {
        let mut tree = MockTree::new();
        let mut queues = ReferenceQueues::new();
        let mut built = 0usize;

        for (file, defs) in self.document.entries() {
            for def in defs {
                if self.build_definition(&mut tree, &mut queues, file, def)? {
                    built += 1;
                }
            }
        }

        let queued = queues.imports.len() + queues.refs.len();
        let stats = CrossReferenceResolver::new(&mut tree)
            .resolve(&mut queues.imports, &mut queues.refs);

        info!(
            files = self.document.len(),
            definitions = built,
            stubs = tree.sandbox().len(),
            references = queued,
            unresolved = stats.unresolved,
            "Built mock tree"
        );
        Ok(tree)
    }

    fn build_definition(
        &self,
        tree: &mut MockTree,
        queues: &mut ReferenceQueues,
        file: &str,
        def: &NamespaceDefinition,
    ) -> Result<bool> {
        if !self.includes(file, def)? {
            debug!(file, namespace = ?def.namespace, "Skipping definition outside its file");
            return Ok(false);
        }
        let namespace = namespace_of(file, def)?;
        let container = materialize(tree, namespace)?;

        let permissions = def.permission_names();
        if !permissions.is_empty() {
            tree.record_permissions(namespace, permissions);
        }
        if let Some(specifier) = def.import.as_deref() {
            debug!(namespace, specifier, "Queued namespace import");
            queues.push(
                ReferenceKind::Import,
                Reference::new(namespace, specifier, namespace),
            );
        }

        let mut synth = MemberSynthesizer::new(tree, queues);
        synth.synthesize_events(container, &def.events)?;
        synth.synthesize_functions(container, &def.functions)?;
        synth.synthesize_properties(container, &def.properties, namespace)?;
        synth.synthesize_types(container, &def.types, namespace)?;
        Ok(true)
    }
}

/// Ensures every segment of `namespace` exists as an object and returns the
/// leaf. Existing containers are reused.
fn materialize(tree: &mut MockTree, namespace: &str) -> Result<NodeId> {
    namespace
        .split('.')
        .try_fold(tree.root(), |container, segment| {
            tree.ensure_object(container, segment)
        })
}

fn namespace_of<'a>(file: &str, def: &'a NamespaceDefinition) -> Result<&'a str> {
    match def.namespace.as_deref() {
        Some(namespace) if is_valid_namespace(namespace) => Ok(namespace),
        Some(namespace) => Err(MockError::MalformedSchema {
            file: file.to_string(),
            reason: format!("invalid namespace {namespace:?}"),
        }),
        None => Err(MockError::MalformedSchema {
            file: file.to_string(),
            reason: "definition has no namespace".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(value: serde_json::Value) -> SchemaDocument {
        serde_json::from_value(value).unwrap()
    }

    fn includes(file: &str, def: serde_json::Value) -> bool {
        let def: NamespaceDefinition = serde_json::from_value(def).unwrap();
        let doc = SchemaDocument::default();
        NamespaceBuilder::new(&doc).includes(file, &def).unwrap()
    }

    #[test]
    fn test_inclusion_rules() {
        assert!(includes("browser_action.json", json!({ "namespace": "browserAction" })));
        assert!(includes("devtools.json", json!({ "namespace": "devtools.panels" })));
        assert!(includes("devtools_panels.json", json!({ "namespace": "devtools" })));
        assert!(includes("menus_child.json", json!({ "namespace": "menus" })));
        assert!(includes("menus_internal.json", json!({ "namespace": "action" })));
        assert!(includes("storage.json", json!({ "namespace": "tabs", "$import": "x" })));
        assert!(!includes("storage.json", json!({ "namespace": "tabs" })));
    }

    #[test]
    fn test_custom_aliases_replace_defaults() {
        let doc = SchemaDocument::default();
        let config = MockConfig {
            aliases: vec!["contextMenus".into()],
            ..MockConfig::default()
        };
        let builder = NamespaceBuilder::new(&doc).with_config(config);

        let context_menus = NamespaceDefinition::new("contextMenus");
        let action = NamespaceDefinition::new("action");
        assert!(builder.includes("menus.json", &context_menus).unwrap());
        assert!(!builder.includes("browser_action.json", &action).unwrap());
    }

    #[test]
    fn test_missing_namespace_fails_build() {
        let doc = document(json!({
            "tabs.json": [{ "namespace": "tabs" }],
            "windows.json": [{ "functions": [] }]
        }));
        let err = NamespaceBuilder::new(&doc).build().unwrap_err();
        assert!(matches!(
            err,
            MockError::MalformedSchema { ref file, .. } if file == "windows.json"
        ));
    }

    #[test]
    fn test_invalid_namespace_fails_build() {
        let doc = document(json!({ "tabs.json": [{ "namespace": "tabs." }] }));
        assert!(matches!(
            NamespaceBuilder::new(&doc).build(),
            Err(MockError::MalformedSchema { .. })
        ));
    }

    #[test]
    fn test_excluded_definition_is_not_materialized() {
        let doc = document(json!({
            "storage.json": [
                { "namespace": "storage", "functions": [{ "name": "get", "type": "function" }] },
                { "namespace": "tabs", "functions": [{ "name": "query", "type": "function" }] }
            ]
        }));
        let tree = NamespaceBuilder::new(&doc).build().unwrap();
        assert_eq!(tree.namespaces(), vec!["storage"]);
    }

    #[test]
    fn test_deep_namespace_is_materialized() {
        let doc = document(json!({
            "a.json": [{ "namespace": "a.b.c", "properties": { "x": { "value": 1 } } }]
        }));
        let tree = NamespaceBuilder::new(&doc).build().unwrap();
        assert_eq!(tree.to_json(), json!({ "a": { "b": { "c": { "x": 1 } } } }));
    }

    #[test]
    fn test_permissions_are_recorded_not_enforced() {
        let doc = document(json!({
            "menus.json": [
                { "namespace": "menus", "permissions": ["menus"],
                  "functions": [{ "name": "create", "type": "function" }] },
                { "namespace": "menus", "permissions": "activeTab" }
            ]
        }));
        let tree = NamespaceBuilder::new(&doc).build().unwrap();
        assert!(tree.stub("menus.create").is_some());
        assert_eq!(
            tree.permissions("menus"),
            Some(&["menus".to_string(), "activeTab".to_string()][..])
        );
        assert!(tree.permissions("tabs").is_none());
    }
}
