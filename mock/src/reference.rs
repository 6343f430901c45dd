//! Deferred `$import` / `$ref` work items.
//!
//! References are recorded as dotted paths rather than node ids: the target
//! may not exist until the whole document has been walked.

use std::collections::HashMap;

/// Which schema keyword produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `$import` on a namespace or type.
    Import,
    /// `$ref` on a property or type.
    Ref,
}

/// One deferred merge: copy whatever `specifier` names into the
/// placeholder at `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Dotted path of the placeholder.
    pub location: String,
    /// Value of the `$import` / `$ref` keyword.
    pub specifier: String,
    /// Namespace path the reference was found in.
    pub origin: String,
}

impl Reference {
    /// Creates a reference.
    pub fn new(
        location: impl Into<String>,
        specifier: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            specifier: specifier.into(),
            origin: origin.into(),
        }
    }
}

/// Insertion-ordered work-list keyed by location.
///
/// Queuing a second reference for a location already queued replaces the
/// earlier entry in place.
#[derive(Debug, Default)]
pub struct ReferenceQueue {
    entries: Vec<Reference>,
    positions: HashMap<String, usize>,
}

impl ReferenceQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reference.
    pub fn push(&mut self, reference: Reference) {
        match self.positions.get(&reference.location) {
            Some(&index) => self.entries[index] = reference,
            None => {
                self.positions
                    .insert(reference.location.clone(), self.entries.len());
                self.entries.push(reference);
            }
        }
    }

    /// Number of queued references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued references in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter()
    }

    /// Removes and returns every queued reference in insertion order,
    /// leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Reference> {
        self.positions.clear();
        std::mem::take(&mut self.entries)
    }
}

/// The two work-lists of one build.
#[derive(Debug, Default)]
pub struct ReferenceQueues {
    /// `$import` references.
    pub imports: ReferenceQueue,
    /// `$ref` references.
    pub refs: ReferenceQueue,
}

impl ReferenceQueues {
    /// Creates empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reference` on the list for `kind`.
    pub fn push(&mut self, kind: ReferenceKind, reference: Reference) {
        match kind {
            ReferenceKind::Import => self.imports.push(reference),
            ReferenceKind::Ref => self.refs.push(reference),
        }
    }

    /// Returns `true` if both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.refs.is_empty()
    }
}
