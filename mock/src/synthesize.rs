//! Member synthesis: turns one namespace definition's members into stub
//! sub-trees.
//!
//! Every operation writes into a caller-supplied container node and records
//! the `$import` / `$ref` references it meets instead of following them.

use std::collections::BTreeMap;

use tracing::debug;
use webext_schema_core::{
    FunctionMember, Member, MemberKind, PropertyMember, TypeMember, is_valid_namespace,
};

use crate::error::{MockError, Result};
use crate::reference::{Reference, ReferenceKind, ReferenceQueues};
use crate::tree::{EVENT_LISTENER_METHODS, MockNode, MockTree, NodeId};

/// Writes stubs for namespace members into a [`MockTree`].
///
/// # Examples
///
/// ```
/// use webext_schema_core::FunctionMember;
/// use webext_schema_mock::{MemberSynthesizer, MockTree, ReferenceQueues};
///
/// let mut tree = MockTree::new();
/// let mut queues = ReferenceQueues::new();
/// let root = tree.root();
///
/// let mut synth = MemberSynthesizer::new(&mut tree, &mut queues);
/// synth
///     .synthesize_functions(root, &[FunctionMember::function("getURL")])
///     .unwrap();
///
/// assert!(tree.stub("getURL").is_some());
/// ```
pub struct MemberSynthesizer<'a> {
    tree: &'a mut MockTree,
    queues: &'a mut ReferenceQueues,
}

impl<'a> MemberSynthesizer<'a> {
    /// Creates a synthesizer writing into `tree` and queuing references on
    /// `queues`.
    pub fn new(tree: &'a mut MockTree, queues: &'a mut ReferenceQueues) -> Self {
        Self { tree, queues }
    }

    /// Creates an `addListener`/`hasListener`/`removeListener` triple for
    /// every synthesizable event.
    ///
    /// An existing object under the event name is reused.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::ArgumentType`] if `container` is not an object.
    pub fn synthesize_events(&mut self, container: NodeId, events: &[FunctionMember]) -> Result<()> {
        self.tree.object_mut(container)?;
        for event in events {
            let Some(name) = synthesizable_name(event) else {
                continue;
            };
            let listeners = self.tree.ensure_object(container, name)?;
            for method in EVENT_LISTENER_METHODS {
                self.tree.assign_stub(listeners, method)?;
            }
        }
        Ok(())
    }

    /// Creates one stub per synthesizable function.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::ArgumentType`] if `container` is not an object.
    pub fn synthesize_functions(
        &mut self,
        container: NodeId,
        functions: &[FunctionMember],
    ) -> Result<()> {
        self.tree.object_mut(container)?;
        for function in functions {
            if let Some(name) = synthesizable_name(function) {
                self.tree.assign_stub(container, name)?;
            }
        }
        Ok(())
    }

    /// Synthesizes properties keyed by name.
    ///
    /// Per property: a `$ref` is queued first, then the member is placed
    /// according to its [`MemberKind`]; object-like members recurse into
    /// nested `properties` under `namespace.key`.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::ArgumentType`] if `container` is not an object
    /// or `namespace` is not a valid dotted path.
    pub fn synthesize_properties(
        &mut self,
        container: NodeId,
        properties: &BTreeMap<String, PropertyMember>,
        namespace: &str,
    ) -> Result<()> {
        self.tree.object_mut(container)?;
        check_namespace(namespace)?;
        self.fill_properties(container, properties, namespace)
    }

    /// Synthesizes types keyed by `id`.
    ///
    /// Branches like [`synthesize_properties`](Self::synthesize_properties);
    /// additionally queues `$import` and fills object-like types with their
    /// own events and functions. Types without an `id` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::ArgumentType`] if `container` is not an object
    /// or `namespace` is not a valid dotted path.
    pub fn synthesize_types(
        &mut self,
        container: NodeId,
        types: &[TypeMember],
        namespace: &str,
    ) -> Result<()> {
        self.tree.object_mut(container)?;
        check_namespace(namespace)?;
        self.fill_types(container, types, namespace)
    }

    /// Queues a reference found at `location`.
    pub fn enqueue(&mut self, kind: ReferenceKind, location: &str, specifier: &str, origin: &str) {
        debug!(?kind, location, specifier, origin, "Queued reference");
        self.queues
            .push(kind, Reference::new(location, specifier, origin));
    }

    // Paths below are derived from schema keys and may contain empty
    // segments (a property keyed ""), so they are not re-validated.
    fn fill_properties(
        &mut self,
        container: NodeId,
        properties: &BTreeMap<String, PropertyMember>,
        namespace: &str,
    ) -> Result<()> {
        for (key, property) in properties {
            let path = format!("{namespace}.{key}");
            if property.unsupported {
                debug!(path = %path, "Skipping unsupported property");
                continue;
            }
            if let Some(specifier) = property.reference.as_deref() {
                self.enqueue(ReferenceKind::Ref, &path, specifier, namespace);
            }
            if let Some(object) = self.place(container, key, property)? {
                if let Some(nested) = &property.properties {
                    self.fill_properties(object, nested, &path)?;
                }
            }
        }
        Ok(())
    }

    fn fill_types(&mut self, container: NodeId, types: &[TypeMember], namespace: &str) -> Result<()> {
        for member in types {
            let Some(id) = member.id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            let path = format!("{namespace}.{id}");
            if member.unsupported {
                debug!(path = %path, "Skipping unsupported type");
                continue;
            }
            if let Some(specifier) = member.import.as_deref() {
                self.enqueue(ReferenceKind::Import, &path, specifier, namespace);
            }
            if let Some(specifier) = member.reference.as_deref() {
                self.enqueue(ReferenceKind::Ref, &path, specifier, namespace);
            }
            let Some(object) = self.place(container, id, member)? else {
                continue;
            };
            if let Some(events) = &member.events {
                self.synthesize_events(object, events)?;
            }
            if let Some(functions) = &member.functions {
                self.synthesize_functions(object, functions)?;
            }
            if let Some(properties) = &member.properties {
                self.fill_properties(object, properties, &path)?;
            }
        }
        Ok(())
    }

    /// Places one member under `container[key]`. Returns the object node for
    /// object-like members.
    fn place(&mut self, container: NodeId, key: &str, member: &impl Member) -> Result<Option<NodeId>> {
        match member.classify() {
            MemberKind::Literal(value) => {
                self.tree
                    .assign(container, key, MockNode::Literal(value.clone()))?;
                Ok(None)
            }
            MemberKind::Function => {
                self.tree.assign_stub(container, key)?;
                Ok(None)
            }
            MemberKind::Object | MemberKind::Reference(_) => {
                self.tree.ensure_object(container, key).map(Some)
            }
            MemberKind::Primitive => {
                self.tree.assign(container, key, MockNode::Null)?;
                Ok(None)
            }
        }
    }
}

fn synthesizable_name(member: &FunctionMember) -> Option<&str> {
    if !member.is_synthesizable() {
        if member.unsupported {
            debug!(name = ?member.name, "Skipping unsupported member");
        }
        return None;
    }
    member.name.as_deref()
}

fn check_namespace(namespace: &str) -> Result<()> {
    if is_valid_namespace(namespace) {
        Ok(())
    } else {
        Err(MockError::ArgumentType {
            expected: "namespace path",
            found: format!("{namespace:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    struct Fixture {
        tree: MockTree,
        queues: ReferenceQueues,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tree: MockTree::new(),
                queues: ReferenceQueues::new(),
            }
        }

        fn synth(&mut self) -> (MemberSynthesizer<'_>, NodeId) {
            let root = self.tree.root();
            (MemberSynthesizer::new(&mut self.tree, &mut self.queues), root)
        }
    }

    fn properties(value: Value) -> BTreeMap<String, PropertyMember> {
        serde_json::from_value(value).unwrap()
    }

    fn types(value: Value) -> Vec<TypeMember> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_events_create_listener_triples() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_events(
                root,
                &[
                    FunctionMember::function("onClicked"),
                    FunctionMember::function("onLegacy").unsupported(),
                ],
            )
            .unwrap();

        assert_eq!(
            fx.tree.to_json(),
            json!({
                "onClicked": {
                    "addListener": "function",
                    "hasListener": "function",
                    "removeListener": "function"
                }
            })
        );
        assert!(fx.tree.event("onClicked").is_some());
    }

    #[test]
    fn test_functions_skip_unsupported_and_non_functions() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        let not_function = FunctionMember {
            name: Some("helper".into()),
            kind: Some("object".into()),
            unsupported: false,
        };
        synth
            .synthesize_functions(
                root,
                &[
                    FunctionMember::function("create"),
                    FunctionMember::function("remove").unsupported(),
                    not_function,
                ],
            )
            .unwrap();

        assert_eq!(fx.tree.namespaces(), vec!["create"]);
        assert_eq!(fx.tree.sandbox().len(), 1);
    }

    #[test]
    fn test_properties_branch_priority() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_properties(
                root,
                &properties(json!({
                    "TAB_ID_NONE": { "value": -1, "type": "integer" },
                    "enabled": { "value": false },
                    "reset": { "type": "function" },
                    "settings": { "type": "object", "properties": { "mode": { "type": "string" } } },
                    "nested": { "properties": { "depth": { "value": 2 } } },
                    "lastError": { "type": "object" },
                    "id": { "type": "string" },
                    "legacy": { "value": 1, "unsupported": true }
                })),
                "ns",
            )
            .unwrap();

        assert_eq!(
            fx.tree.to_json(),
            json!({
                "TAB_ID_NONE": -1,
                "enabled": false,
                "reset": "function",
                "settings": { "mode": null },
                "nested": { "depth": 2 },
                "lastError": {},
                "id": null
            })
        );
        assert!(fx.queues.is_empty());
    }

    #[test]
    fn test_property_ref_queues_and_leaves_placeholder() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_properties(
                root,
                &properties(json!({ "local": { "$ref": "StorageArea" } })),
                "storage",
            )
            .unwrap();

        assert_eq!(fx.tree.to_json(), json!({ "local": {} }));
        let refs: Vec<_> = fx.queues.refs.iter().cloned().collect();
        assert_eq!(
            refs,
            vec![Reference::new("storage.local", "StorageArea", "storage")]
        );
    }

    #[test]
    fn test_nested_property_ref_uses_extended_origin() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_properties(
                root,
                &properties(json!({ "outer": { "properties": { "inner": { "$ref": "Thing" } } } })),
                "ns",
            )
            .unwrap();

        let refs: Vec<_> = fx.queues.refs.iter().cloned().collect();
        assert_eq!(refs, vec![Reference::new("ns.outer.inner", "Thing", "ns.outer")]);
    }

    #[test]
    fn test_empty_property_key_recurses() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_properties(
                root,
                &properties(json!({
                    "": {
                        "type": "object",
                        "properties": {
                            "x": { "value": 1 },
                            "": { "properties": { "inner": { "$ref": "Thing" } } }
                        }
                    }
                })),
                "foo",
            )
            .unwrap();

        assert_eq!(fx.tree.to_json(), json!({ "": { "": { "inner": {} }, "x": 1 } }));
        let refs: Vec<_> = fx.queues.refs.iter().cloned().collect();
        assert_eq!(refs, vec![Reference::new("foo...inner", "Thing", "foo..")]);
    }

    #[test]
    fn test_types_object_and_members() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_types(
                root,
                &types(json!([
                    { "id": "baz", "type": "object" },
                    { "id": "Setting", "functions": [{ "name": "get", "type": "function" }],
                      "events": [{ "name": "onChange", "type": "function" }] },
                    { "id": "Color", "type": "string", "enum": ["red"] },
                    { "id": "Port", "$import": "runtime.Port" },
                    { "id": "Gone", "type": "object", "unsupported": true },
                    { "$extend": "Other", "properties": {} }
                ])),
                "foo",
            )
            .unwrap();

        assert_eq!(
            fx.tree.to_json(),
            json!({
                "baz": {},
                "Setting": {
                    "get": "function",
                    "onChange": {
                        "addListener": "function",
                        "hasListener": "function",
                        "removeListener": "function"
                    }
                },
                "Color": null,
                "Port": {}
            })
        );
        let imports: Vec<_> = fx.queues.imports.iter().cloned().collect();
        assert_eq!(imports, vec![Reference::new("foo.Port", "runtime.Port", "foo")]);
    }

    #[test]
    fn test_existing_object_is_extended_not_replaced() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();
        synth
            .synthesize_types(root, &types(json!([{ "id": "Area", "type": "object" }])), "ns")
            .unwrap();
        let area = fx.tree.lookup("Area").unwrap();

        let (mut synth, root) = fx.synth();
        synth
            .synthesize_types(
                root,
                &types(json!([{ "id": "Area", "functions": [{ "name": "get", "type": "function" }] }])),
                "ns",
            )
            .unwrap();

        assert_eq!(fx.tree.lookup("Area"), Some(area));
        assert!(fx.tree.stub("Area.get").is_some());
    }

    #[test]
    fn test_non_object_container_is_rejected() {
        let mut fx = Fixture::new();
        let root = fx.tree.root();
        let stub = fx.tree.assign_stub(root, "get").unwrap();
        let mut synth = MemberSynthesizer::new(&mut fx.tree, &mut fx.queues);

        for result in [
            synth.synthesize_events(stub, &[]),
            synth.synthesize_functions(stub, &[]),
            synth.synthesize_properties(stub, &BTreeMap::new(), "ns"),
            synth.synthesize_types(stub, &[], "ns"),
        ] {
            assert!(matches!(result, Err(MockError::ArgumentType { expected: "object", .. })));
        }
    }

    #[test]
    fn test_node_from_another_tree_is_rejected() {
        let mut other = MockTree::new();
        let other_root = other.root();
        let foreign = other.ensure_object(other_root, "runtime").unwrap();

        let mut fx = Fixture::new();
        let mut synth = MemberSynthesizer::new(&mut fx.tree, &mut fx.queues);
        let result = synth.synthesize_functions(foreign, &[FunctionMember::function("connect")]);

        assert!(matches!(result, Err(MockError::ArgumentType { expected: "object", .. })));
        assert_eq!(fx.tree.sandbox().len(), 0);
    }

    #[test]
    fn test_invalid_namespace_is_rejected() {
        let mut fx = Fixture::new();
        let (mut synth, root) = fx.synth();

        let err = synth
            .synthesize_properties(root, &BTreeMap::new(), "")
            .unwrap_err();
        assert!(matches!(err, MockError::ArgumentType { expected: "namespace path", .. }));

        let err = synth.synthesize_types(root, &[], "a..b").unwrap_err();
        assert!(matches!(err, MockError::ArgumentType { expected: "namespace path", .. }));
    }
}
