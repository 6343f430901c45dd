//! Arena-backed object graph of synthesized stubs.
//!
//! Nodes live in one `Vec` and objects map member names to [`NodeId`]s.
//! Copying an entry copies the id, so the same nested object can be reachable
//! from several paths; this is how resolved references share content with
//! their targets.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{MockError, Result};
use crate::stub::{Sandbox, Stub};

/// Names of the three stubs an event exposes.
pub const EVENT_LISTENER_METHODS: [&str; 3] = ["addListener", "hasListener", "removeListener"];

/// Rendering of a stub in [`MockTree::to_json`].
pub const STUB_MARKER: &str = "function";

/// Rendering of a back-edge in [`MockTree::to_json`].
pub const CIRCULAR_MARKER: &str = "[circular]";

/// Index of a node in a [`MockTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One node of the graph.
#[derive(Debug, Clone)]
pub enum MockNode {
    /// Placeholder for a primitive-typed member.
    Null,
    /// Literal schema value.
    Literal(Value),
    /// Recording callable.
    Stub(Stub),
    /// Container of named members.
    Object(BTreeMap<String, NodeId>),
}

impl MockNode {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Literal(_) => "literal",
            Self::Stub(_) => "stub",
            Self::Object(_) => "object",
        }
    }

    /// Returns the member map if this node is an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, NodeId>> {
        match self {
            Self::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Returns the stub if this node is one.
    pub fn as_stub(&self) -> Option<&Stub> {
        match self {
            Self::Stub(stub) => Some(stub),
            _ => None,
        }
    }
}

/// The three stubs of an event member.
#[derive(Debug, Clone)]
pub struct EventStub {
    /// `addListener`
    pub add_listener: Stub,
    /// `hasListener`
    pub has_listener: Stub,
    /// `removeListener`
    pub remove_listener: Stub,
}

/// Synthesized API surface, keyed by namespace path.
///
/// Nested dotted namespaces are nested objects: `devtools.inspectedWindow`
/// is reachable as `tree.get("devtools.inspectedWindow")`.
///
/// # Examples
///
/// ```
/// use webext_schema_core::SchemaDocument;
/// use webext_schema_mock::synthesize;
///
/// let doc = SchemaDocument::parse(r#"{
///     "runtime.json": [{
///         "namespace": "runtime",
///         "functions": [{ "name": "sendMessage", "type": "function" }],
///         "events": [{ "name": "onMessage", "type": "function" }]
///     }]
/// }"#).unwrap();
///
/// let tree = synthesize(&doc).unwrap();
/// let send = tree.stub("runtime.sendMessage").unwrap();
/// send.call(&[]).unwrap();
/// assert_eq!(send.call_count(), 1);
///
/// let on_message = tree.event("runtime.onMessage").unwrap();
/// assert!(!on_message.add_listener.called());
/// ```
#[derive(Debug)]
pub struct MockTree {
    nodes: Vec<MockNode>,
    permissions: BTreeMap<String, Vec<String>>,
    sandbox: Sandbox,
}

impl MockTree {
    /// Creates a tree holding only an empty root object.
    pub fn new() -> Self {
        Self {
            nodes: vec![MockNode::Object(BTreeMap::new())],
            permissions: BTreeMap::new(),
            sandbox: Sandbox::new(),
        }
    }

    /// Id of the root object.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node for `id`, or `None` if the id was not produced by
    /// this tree.
    pub fn node(&self, id: NodeId) -> Option<&MockNode> {
        self.nodes.get(id.0)
    }

    /// Returns the child `key` of an object node.
    pub fn child(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.node(id)?.as_object()?.get(key).copied()
    }

    /// Resolves a dotted path from the root. Returns `None` if any segment
    /// is missing or crosses a non-object node.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.lookup_from(self.root(), path)
    }

    /// Resolves a dotted path relative to `start`.
    pub fn lookup_from(&self, start: NodeId, path: &str) -> Option<NodeId> {
        path.split('.')
            .try_fold(start, |current, segment| self.child(current, segment))
    }

    /// Returns the node at a dotted path.
    pub fn get(&self, path: &str) -> Option<&MockNode> {
        self.lookup(path).and_then(|id| self.node(id))
    }

    /// Returns `true` if a node exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Member names of the object at `path`, in sorted order.
    pub fn keys(&self, path: &str) -> Option<Vec<&str>> {
        self.get(path)?
            .as_object()
            .map(|members| members.keys().map(String::as_str).collect())
    }

    /// Top-level namespace names.
    pub fn namespaces(&self) -> Vec<&str> {
        self.node(self.root())
            .and_then(MockNode::as_object)
            .map(|members| members.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns a handle to the stub at `path`.
    pub fn stub(&self, path: &str) -> Option<Stub> {
        self.get(path)?.as_stub().cloned()
    }

    /// Returns the listener stubs of the event at `path`.
    pub fn event(&self, path: &str) -> Option<EventStub> {
        let id = self.lookup(path)?;
        let [add, has, remove] = EVENT_LISTENER_METHODS
            .map(|name| self.child(id, name).and_then(|c| self.node(c)?.as_stub().cloned()));
        Some(EventStub {
            add_listener: add?,
            has_listener: has?,
            remove_listener: remove?,
        })
    }

    /// Permissions declared by the definitions that produced `namespace`.
    pub fn permissions(&self, namespace: &str) -> Option<&[String]> {
        self.permissions.get(namespace).map(Vec::as_slice)
    }

    /// Sandbox owning every stub in the tree.
    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Number of nodes allocated, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Renders the graph reachable from the root as JSON.
    ///
    /// Stubs render as `"function"`; an object reachable from itself renders
    /// as `"[circular]"` at the back-edge.
    pub fn to_json(&self) -> Value {
        self.node_to_json(self.root())
    }

    /// Renders the graph reachable from `id` as JSON. An id foreign to this
    /// tree renders as `null`.
    pub fn node_to_json(&self, id: NodeId) -> Value {
        let mut ancestors = Vec::new();
        self.render(id, &mut ancestors)
    }

    fn render(&self, id: NodeId, ancestors: &mut Vec<NodeId>) -> Value {
        match self.node(id) {
            None | Some(MockNode::Null) => Value::Null,
            Some(MockNode::Literal(value)) => value.clone(),
            Some(MockNode::Stub(_)) => Value::String(STUB_MARKER.to_string()),
            Some(MockNode::Object(members)) => {
                if ancestors.contains(&id) {
                    return Value::String(CIRCULAR_MARKER.to_string());
                }
                ancestors.push(id);
                let map: Map<String, Value> = members
                    .iter()
                    .map(|(key, child)| (key.clone(), self.render(*child, ancestors)))
                    .collect();
                ancestors.pop();
                Value::Object(map)
            }
        }
    }

    pub(crate) fn alloc(&mut self, node: MockNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn object_mut(&mut self, id: NodeId) -> Result<&mut BTreeMap<String, NodeId>> {
        match self.nodes.get_mut(id.0) {
            Some(MockNode::Object(members)) => Ok(members),
            Some(other) => Err(MockError::ArgumentType {
                expected: "object",
                found: other.kind().to_string(),
            }),
            None => Err(MockError::ArgumentType {
                expected: "object",
                found: format!("unknown node {}", id.0),
            }),
        }
    }

    /// Assigns `node` to `container[key]`, replacing any previous member.
    pub(crate) fn assign(&mut self, container: NodeId, key: &str, node: MockNode) -> Result<NodeId> {
        self.object_mut(container)?;
        let id = self.alloc(node);
        self.object_mut(container)?.insert(key.to_string(), id);
        Ok(id)
    }

    /// Assigns a fresh sandboxed stub to `container[key]`.
    pub(crate) fn assign_stub(&mut self, container: NodeId, key: &str) -> Result<NodeId> {
        self.object_mut(container)?;
        let stub = self.sandbox.stub();
        self.assign(container, key, MockNode::Stub(stub))
    }

    /// Returns the object at `container[key]`, creating it if absent.
    ///
    /// An existing object is reused, never replaced. A non-object member is
    /// replaced by a fresh object.
    pub(crate) fn ensure_object(&mut self, container: NodeId, key: &str) -> Result<NodeId> {
        if let Some(existing) = self.object_mut(container)?.get(key).copied() {
            if self.node(existing).and_then(MockNode::as_object).is_some() {
                return Ok(existing);
            }
        }
        self.assign(container, key, MockNode::Object(BTreeMap::new()))
    }

    /// Copies every member of `source` onto `target`, sharing child nodes.
    ///
    /// A no-op unless both are distinct objects.
    pub(crate) fn merge_members(&mut self, target: NodeId, source: NodeId) -> usize {
        if target == source {
            return 0;
        }
        let Some(members) = self.node(source).and_then(MockNode::as_object).cloned() else {
            return 0;
        };
        match self.nodes.get_mut(target.0) {
            Some(MockNode::Object(dest)) => {
                let count = members.len();
                dest.extend(members);
                count
            }
            _ => 0,
        }
    }

    pub(crate) fn record_permissions(&mut self, namespace: &str, names: Vec<String>) {
        let entry = self.permissions.entry(namespace.to_string()).or_default();
        for name in names {
            if !entry.contains(&name) {
                entry.push(name);
            }
        }
    }
}

impl Default for MockTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_ensure_object_reuses_existing() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let first = tree.ensure_object(root, "foo").unwrap();
        let second = tree.ensure_object(root, "foo").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ensure_object_replaces_null() {
        let mut tree = MockTree::new();
        let root = tree.root();
        tree.assign(root, "foo", MockNode::Null).unwrap();
        let id = tree.ensure_object(root, "foo").unwrap();
        assert!(tree.node(id).and_then(MockNode::as_object).is_some());
        assert_eq!(tree.to_json(), json!({ "foo": {} }));
    }

    #[test]
    fn test_assign_into_non_object_fails() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let stub = tree.assign_stub(root, "get").unwrap();

        let err = tree.assign(stub, "x", MockNode::Null).unwrap_err();
        assert!(matches!(
            err,
            MockError::ArgumentType { expected: "object", ref found } if found == "stub"
        ));
    }

    #[test]
    fn test_foreign_node_id_is_rejected() {
        let mut big = MockTree::new();
        let root = big.root();
        let mut last = root;
        for name in ["a", "b", "c"] {
            last = big.ensure_object(root, name).unwrap();
        }

        let mut small = MockTree::new();
        assert!(small.node(last).is_none());
        assert!(small.child(last, "x").is_none());
        assert_eq!(small.node_to_json(last), Value::Null);
        assert!(matches!(
            small.assign(last, "x", MockNode::Null),
            Err(MockError::ArgumentType { expected: "object", .. })
        ));
        assert!(matches!(
            small.ensure_object(last, "x"),
            Err(MockError::ArgumentType { .. })
        ));
        let small_root = small.root();
        assert_eq!(small.merge_members(last, small_root), 0);
        assert_eq!(small.merge_members(small_root, last), 0);
        assert_eq!(small.node_count(), 1);
    }

    #[test]
    fn test_lookup_walks_dotted_paths() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let devtools = tree.ensure_object(root, "devtools").unwrap();
        let panels = tree.ensure_object(devtools, "panels").unwrap();
        tree.assign(panels, "themeName", MockNode::Literal(json!("dark")))
            .unwrap();

        assert_eq!(tree.lookup("devtools.panels"), Some(panels));
        assert!(tree.lookup("devtools.missing").is_none());
        assert!(tree.lookup("devtools.panels.themeName.length").is_none());
        assert_eq!(tree.keys("devtools"), Some(vec!["panels"]));
    }

    #[test]
    fn test_merge_members_shares_children() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let foo = tree.ensure_object(root, "foo").unwrap();
        let baz = tree.ensure_object(foo, "baz").unwrap();
        let bar = tree.ensure_object(root, "bar").unwrap();

        assert_eq!(tree.merge_members(bar, foo), 1);
        assert_eq!(tree.lookup("bar.baz"), Some(baz));
    }

    #[test]
    fn test_merge_members_ignores_non_objects() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let foo = tree.ensure_object(root, "foo").unwrap();
        let null = tree.assign(root, "value", MockNode::Null).unwrap();

        assert_eq!(tree.merge_members(foo, null), 0);
        assert_eq!(tree.merge_members(null, foo), 0);
        assert_eq!(tree.merge_members(foo, foo), 0);
    }

    #[test]
    fn test_to_json_marks_cycles() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let foo = tree.ensure_object(root, "foo").unwrap();
        let bar = tree.ensure_object(foo, "bar").unwrap();
        tree.merge_members(bar, foo);

        assert_eq!(
            tree.to_json(),
            json!({ "foo": { "bar": { "bar": CIRCULAR_MARKER } } })
        );
    }

    #[test]
    fn test_event_requires_all_listener_stubs() {
        let mut tree = MockTree::new();
        let root = tree.root();
        let on_clicked = tree.ensure_object(root, "onClicked").unwrap();
        for name in EVENT_LISTENER_METHODS {
            tree.assign_stub(on_clicked, name).unwrap();
        }
        let partial = tree.ensure_object(root, "onPartial").unwrap();
        tree.assign_stub(partial, "addListener").unwrap();

        assert!(tree.event("onClicked").is_some());
        assert!(tree.event("onPartial").is_none());
        assert_eq!(tree.sandbox().len(), 4);
    }
}
