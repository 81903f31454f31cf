//! The typed container backing each child slot.
//!
//! A [`TypedContainer`] is an ordered sequence of [`Entry`] values
//! constrained to an allowed [`TypeSet`]. Containers do not own the nodes
//! they list — entries are arena ids — so a slice of a container is a view:
//! an independent backing list over the same shared nodes.
//!
//! Validation (conversion + membership check) and attachment need access to
//! the arena and therefore live on [`Tree`](crate::Tree); the container
//! itself only offers the pure sequence operations.

use std::fmt;

use crate::tree::node::{Converter, NodeId, SlotName, SlotSpec, TypeSet};

/// One element of a slot: a node reference or a bare scalar.
///
/// Scalars are a deliberate narrow exception to the ownership model: they
/// can sit in a container as leaf values but are never attached to a
/// parent (insertion logs a diagnostic instead).
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Node(NodeId),
    Int(i64),
    Str(String),
    Bool(bool),
}

impl Entry {
    /// The node id, if this entry is a node.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Entry::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Entry::Node(_))
    }

    /// Type class of a scalar entry; `None` for nodes (a node's class
    /// depends on its kind and is resolved by the tree).
    pub(crate) fn scalar_class(&self) -> Option<TypeSet> {
        match self {
            Entry::Node(_) => None,
            Entry::Int(_) => Some(TypeSet::INT),
            Entry::Str(_) => Some(TypeSet::STR),
            Entry::Bool(_) => Some(TypeSet::BOOL),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Node(id) => write!(f, "#{}", id.0),
            Entry::Int(n) => write!(f, "{n}"),
            Entry::Str(s) => f.write_str(s),
            Entry::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<NodeId> for Entry {
    fn from(id: NodeId) -> Self {
        Entry::Node(id)
    }
}

impl From<&str> for Entry {
    fn from(s: &str) -> Self {
        Entry::Str(s.to_string())
    }
}

impl From<String> for Entry {
    fn from(s: String) -> Self {
        Entry::Str(s)
    }
}

impl From<i64> for Entry {
    fn from(n: i64) -> Self {
        Entry::Int(n)
    }
}

impl From<bool> for Entry {
    fn from(b: bool) -> Self {
        Entry::Bool(b)
    }
}

/// Ordered, type-constrained sequence of child entries for one slot.
#[derive(Debug, Clone)]
pub struct TypedContainer {
    pub(crate) parent: Option<NodeId>,
    pub(crate) location: Option<SlotName>,
    pub(crate) oktypes: TypeSet,
    pub(crate) converter: Option<Converter>,
    pub(crate) entries: Vec<Entry>,
}

impl TypedContainer {
    /// An empty detached container admitting `oktypes`.
    pub fn new(oktypes: TypeSet) -> Self {
        TypedContainer {
            parent: None,
            location: None,
            oktypes,
            converter: None,
            entries: Vec::new(),
        }
    }

    /// An empty detached container with a conversion step.
    pub fn with_converter(oktypes: TypeSet, converter: Converter) -> Self {
        TypedContainer {
            converter: Some(converter),
            ..TypedContainer::new(oktypes)
        }
    }

    /// Container for a declared slot; the parent id is wired in when the
    /// owning node is allocated.
    pub(crate) fn for_slot(spec: &SlotSpec) -> Self {
        TypedContainer {
            parent: None,
            location: Some(spec.name),
            oktypes: spec.oktypes,
            converter: spec.converter,
            entries: Vec::new(),
        }
    }

    /// The permitted type set.
    pub fn oktypes(&self) -> TypeSet {
        self.oktypes
    }

    /// The node owning this slot, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The slot this container backs.
    pub fn location(&self) -> Option<SlotName> {
        self.location
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Node id at `index`; `None` if out of range or the entry is a scalar.
    pub fn node_at(&self, index: usize) -> Option<NodeId> {
        self.entries.get(index).and_then(Entry::as_node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Node entries only, in order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().filter_map(Entry::as_node)
    }

    /// Position of `id` in this container, by identity.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.as_node() == Some(id))
    }

    /// A view over `range`: a new container sharing this one's
    /// parent/location/oktypes/converter. The backing list is independent
    /// (mutating the view's list does not touch the original) but the
    /// contained nodes are shared.
    pub fn slice(&self, range: std::ops::Range<usize>) -> TypedContainer {
        let end = range.end.min(self.entries.len());
        let start = range.start.min(end);
        TypedContainer {
            parent: self.parent,
            location: self.location,
            oktypes: self.oktypes,
            converter: self.converter,
            entries: self.entries[start..end].to_vec(),
        }
    }

    /// Whether a value of class `class` passes the membership test.
    pub(crate) fn admits(&self, class: TypeSet) -> bool {
        self.oktypes.intersects(class)
    }
}

impl<'a> IntoIterator for &'a TypedContainer {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for TypedContainer {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_a_view_with_shared_identity() {
        let mut container = TypedContainer::new(TypeSet::INLINE);
        container.entries = vec![
            Entry::Node(NodeId(1)),
            Entry::Node(NodeId(2)),
            Entry::Node(NodeId(3)),
        ];

        let view = container.slice(0..2);
        assert_eq!(view.len(), 2);
        assert_eq!(view.oktypes(), container.oktypes());
        assert_eq!(view.node_at(0), Some(NodeId(1)));
        assert_eq!(view.node_at(1), Some(NodeId(2)));

        // The view's backing list is independent of the original.
        let mut view = view;
        view.entries.pop();
        assert_eq!(container.len(), 3);
    }

    #[test]
    fn slice_clamps_out_of_range_bounds() {
        let mut container = TypedContainer::new(TypeSet::INLINE);
        container.entries = vec![Entry::Node(NodeId(7))];
        assert_eq!(container.slice(0..10).len(), 1);
        assert_eq!(container.slice(5..10).len(), 0);
    }

    #[test]
    fn index_of_matches_by_identity() {
        let mut container = TypedContainer::new(TypeSet::INLINE);
        container.entries = vec![Entry::Node(NodeId(4)), Entry::Str("x".into())];
        assert_eq!(container.index_of(NodeId(4)), Some(0));
        assert_eq!(container.index_of(NodeId(5)), None);
    }

    #[test]
    fn scalar_entries_report_their_class() {
        assert_eq!(Entry::from(3i64).scalar_class(), Some(TypeSet::INT));
        assert_eq!(Entry::from("s").scalar_class(), Some(TypeSet::STR));
        assert_eq!(Entry::from(true).scalar_class(), Some(TypeSet::BOOL));
        assert_eq!(Entry::Node(NodeId(0)).scalar_class(), None);
    }
}
