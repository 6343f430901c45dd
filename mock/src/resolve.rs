//! Deferred reference resolution.
//!
//! Runs once per build, after every definition has been synthesized. Each
//! queued reference is looked up against the finished tree and the target's
//! members are copied onto the placeholder, sharing nested nodes.
//!
//! Resolution is a single pass in queue order (imports first). A target that
//! is itself a placeholder resolved later in the same pass contributes only
//! the members it has at the time it is copied.

use tracing::debug;

use crate::reference::{Reference, ReferenceQueue};
use crate::tree::{MockTree, NodeId};

/// Outcome counts of one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// References whose placeholder and target were both found.
    pub resolved: usize,
    /// References left as empty placeholders.
    pub unresolved: usize,
}

/// Drains reference queues against a finished [`MockTree`].
///
/// # Examples
///
/// ```
/// use webext_schema_mock::{CrossReferenceResolver, MockTree, Reference, ReferenceQueue};
///
/// let mut tree = MockTree::new();
/// let mut imports = ReferenceQueue::new();
/// let mut refs = ReferenceQueue::new();
/// refs.push(Reference::new("missing.location", "Nowhere", "missing"));
///
/// let stats = CrossReferenceResolver::new(&mut tree).resolve(&mut imports, &mut refs);
/// assert_eq!(stats.unresolved, 1);
/// assert!(refs.is_empty());
/// ```
pub struct CrossReferenceResolver<'t> {
    tree: &'t mut MockTree,
}

impl<'t> CrossReferenceResolver<'t> {
    /// Creates a resolver over `tree`.
    pub fn new(tree: &'t mut MockTree) -> Self {
        Self { tree }
    }

    /// Processes every queued reference exactly once, imports first, then
    /// clears both queues.
    ///
    /// Missing placeholders or targets are not errors; they are counted as
    /// unresolved and leave the tree untouched.
    pub fn resolve(
        &mut self,
        imports: &mut ReferenceQueue,
        refs: &mut ReferenceQueue,
    ) -> ResolveStats {
        let mut stats = ResolveStats::default();
        for reference in imports.drain().into_iter().chain(refs.drain()) {
            if self.apply(&reference) {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }
        }
        stats
    }

    /// Finds the node a specifier names, relative to the origin namespace.
    ///
    /// A dotted specifier is a path from the root. A bare specifier names a
    /// top-level namespace if one exists, otherwise a member of the
    /// top-level entry keyed by `origin` itself. A dotted origin such as
    /// `devtools.panels` is a single key there, not a path, so sibling
    /// lookups from nested namespaces do not resolve.
    pub fn find_target(&self, specifier: &str, origin: &str) -> Option<NodeId> {
        if specifier.contains('.') {
            return self.tree.lookup(specifier);
        }
        let root = self.tree.root();
        self.tree.child(root, specifier).or_else(|| {
            self.tree
                .child(root, origin)
                .and_then(|namespace| self.tree.child(namespace, specifier))
        })
    }

    fn apply(&mut self, reference: &Reference) -> bool {
        let Some(placeholder) = self.tree.lookup(&reference.location) else {
            debug!(location = %reference.location, "Reference placeholder missing");
            return false;
        };
        let Some(target) = self.find_target(&reference.specifier, &reference.origin) else {
            debug!(
                location = %reference.location,
                specifier = %reference.specifier,
                origin = %reference.origin,
                "Unresolved reference"
            );
            return false;
        };
        let copied = self.tree.merge_members(placeholder, target);
        debug!(
            location = %reference.location,
            specifier = %reference.specifier,
            copied,
            "Resolved reference"
        );
        true
    }
}
