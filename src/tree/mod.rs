//! The arena-backed document tree.
//!
//! A [`Tree`] owns every node of a document and hands out [`Copy`]
//! [`NodeId`] handles. Parent back-references are arena indices rather
//! than owning pointers, so shared structure (slice views, deferred
//! appends) never creates ownership cycles. Nodes are never deallocated,
//! which keeps every minted id valid for the tree's lifetime.
//!
//! All slot mutation funnels through one validation path: optional string
//! conversion, then a [`TypeSet`] membership check, then attachment
//! (wiring the child's parent and location). Construction-time population
//! and post-hoc edits behave identically.

pub mod container;
pub mod node;
pub mod scope;

use tracing::debug;

use crate::error::{Error, Result};
use crate::tree::container::{Entry, TypedContainer};
use crate::tree::node::{Converter, NodeData, NodeId, NodeKind, SlotName};

/// An arena of document nodes.
///
/// # Examples
///
/// ```
/// use rstree::Tree;
///
/// let mut tree = Tree::new();
/// let doc = tree.document(None);
/// let para = tree.paragraph("Hello world");
/// tree.append(doc, para)?;
/// assert_eq!(tree.dump(doc), "Hello world");
/// # Ok::<(), rstree::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    /// Number of nodes allocated so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a bare node of `kind` with empty slots.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind));
        id
    }

    /// Borrow the data of `id`.
    ///
    /// Ids are only minted by [`alloc`](Tree::alloc) and nodes are never
    /// removed, so any id from this tree is in range. Passing an id from
    /// a different tree panics or silently aliases another node.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Kind of `id`.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    // ======================================================================
    // Vocabulary constructors
    // ======================================================================

    /// A document root. `textwidth` is the wrap width applied to
    /// paragraphs rendered directly under the document or a section;
    /// `None` disables wrapping.
    pub fn document(&mut self, textwidth: Option<usize>) -> NodeId {
        let id = self.alloc(NodeKind::Document);
        self.node_mut(id).textwidth = textwidth;
        id
    }

    /// A single literal text run. The string is kept verbatim, spaces
    /// included; use the phrase-taking constructors for word splitting.
    pub fn text(&mut self, s: &str) -> NodeId {
        let id = self.alloc(NodeKind::Str);
        self.node_mut(id).text = s.to_string();
        id
    }

    pub fn space(&mut self) -> NodeId {
        self.alloc(NodeKind::Space)
    }

    pub fn line_break(&mut self) -> NodeId {
        self.alloc(NodeKind::LineBreak)
    }

    /// A neutral inline run holding the words of `s`.
    pub fn span(&mut self, s: &str) -> NodeId {
        self.inline_run(NodeKind::Span, s)
    }

    /// `*emphasized*` inline text.
    pub fn emph(&mut self, s: &str) -> NodeId {
        self.inline_run(NodeKind::Emph, s)
    }

    /// `**strong**` inline text.
    pub fn strong(&mut self, s: &str) -> NodeId {
        self.inline_run(NodeKind::Strong, s)
    }

    /// A wrapped paragraph holding the words of `s`.
    pub fn paragraph(&mut self, s: &str) -> NodeId {
        self.inline_run(NodeKind::Paragraph, s)
    }

    /// An unwrapped block holding the words of `s`.
    pub fn plain(&mut self, s: &str) -> NodeId {
        self.inline_run(NodeKind::Plain, s)
    }

    /// The document title header.
    pub fn title(&mut self, title: &str) -> NodeId {
        self.header(NodeKind::Title, title)
    }

    /// A top-level section header.
    pub fn section(&mut self, title: &str) -> NodeId {
        self.header(NodeKind::Section, title)
    }

    pub fn subsection(&mut self, title: &str) -> NodeId {
        self.header(NodeKind::Subsection, title)
    }

    pub fn subsubsection(&mut self, title: &str) -> NodeId {
        self.header(NodeKind::Subsubsection, title)
    }

    pub fn bullet_list(&mut self) -> NodeId {
        self.alloc(NodeKind::BulletList)
    }

    pub fn enumerated_list(&mut self) -> NodeId {
        self.alloc(NodeKind::EnumeratedList)
    }

    pub fn field_list(&mut self) -> NodeId {
        self.alloc(NodeKind::FieldList)
    }

    /// A bullet-list item whose body is the words of `s`.
    pub fn list_item(&mut self, s: &str) -> NodeId {
        let id = self.alloc(NodeKind::ListItem);
        let body = self.plain(s);
        self.attach_push(id, SlotName::Content, Entry::Node(body));
        id
    }

    /// A numbered-list item whose body is the words of `s`.
    pub fn enumerated_item(&mut self, s: &str) -> NodeId {
        let id = self.alloc(NodeKind::EnumeratedListItem);
        let body = self.plain(s);
        self.attach_push(id, SlotName::Content, Entry::Node(body));
        id
    }

    /// A `:term: value` field-list item.
    pub fn field_item(&mut self, term: &str, value: &str) -> NodeId {
        let id = self.alloc(NodeKind::FieldListItem);
        let words = self.words(term);
        for word in words {
            self.attach_push(id, SlotName::Term, word);
        }
        let body = self.plain(value);
        self.attach_push(id, SlotName::Content, Entry::Node(body));
        id
    }

    /// A `.. name:: title` directive block.
    pub fn directive(&mut self, name: &str, title: &str) -> NodeId {
        let id = self.alloc(NodeKind::Directive);
        self.node_mut(id).text = name.to_string();
        let words = self.words(title);
        for word in words {
            self.attach_push(id, SlotName::Title, word);
        }
        id
    }

    /// Split `s` on whitespace into `Str` nodes interleaved with `Space`.
    fn words(&mut self, s: &str) -> Vec<Entry> {
        let pieces: Vec<String> = s.split_whitespace().map(str::to_string).collect();
        let mut out = Vec::with_capacity(pieces.len() * 2);
        for piece in pieces {
            if !out.is_empty() {
                out.push(Entry::Node(self.space()));
            }
            let word = self.alloc(NodeKind::Str);
            self.node_mut(word).text = piece;
            out.push(Entry::Node(word));
        }
        out
    }

    fn inline_run(&mut self, kind: NodeKind, s: &str) -> NodeId {
        let id = self.alloc(kind);
        let words = self.words(s);
        for word in words {
            self.attach_push(id, SlotName::Content, word);
        }
        id
    }

    fn header(&mut self, kind: NodeKind, title: &str) -> NodeId {
        let id = self.alloc(kind);
        let words = self.words(title);
        for word in words {
            self.attach_push(id, SlotName::Title, word);
        }
        id
    }

    // ======================================================================
    // Slot access and mutation
    // ======================================================================

    /// Borrow the `name` slot of `id`.
    pub fn slot(&self, id: NodeId, name: SlotName) -> Result<&TypedContainer> {
        let position = self.slot_position(id, name)?;
        Ok(&self.node(id).slots[position])
    }

    /// Replace the contents of a slot, validating each value.
    pub fn set_slot<I>(&mut self, id: NodeId, name: SlotName, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Entry>,
    {
        let position = self.slot_position(id, name)?;
        for entry in std::mem::take(&mut self.node_mut(id).slots[position].entries) {
            self.detach(entry);
        }
        for value in values {
            self.slot_push(id, name, value)?;
        }
        Ok(())
    }

    /// Append a validated value to the end of a slot.
    pub fn slot_push(&mut self, id: NodeId, name: SlotName, value: impl Into<Entry>) -> Result<()> {
        let position = self.slot_position(id, name)?;
        let entry = self.admit(id, position, value.into())?;
        self.attach(id, name, &entry);
        self.node_mut(id).slots[position].entries.push(entry);
        Ok(())
    }

    /// Insert a validated value at `index`, shifting later entries.
    pub fn slot_insert(
        &mut self,
        id: NodeId,
        name: SlotName,
        index: usize,
        value: impl Into<Entry>,
    ) -> Result<()> {
        let position = self.slot_position(id, name)?;
        let len = self.node(id).slots[position].len();
        if index > len {
            return Err(Error::IndexOutOfBounds {
                slot: name,
                index,
                len,
            });
        }
        let entry = self.admit(id, position, value.into())?;
        self.attach(id, name, &entry);
        self.node_mut(id).slots[position].entries.insert(index, entry);
        Ok(())
    }

    /// Replace the entry at `index` with a validated value.
    pub fn slot_set(
        &mut self,
        id: NodeId,
        name: SlotName,
        index: usize,
        value: impl Into<Entry>,
    ) -> Result<()> {
        let position = self.slot_position(id, name)?;
        let len = self.node(id).slots[position].len();
        if index >= len {
            return Err(Error::IndexOutOfBounds {
                slot: name,
                index,
                len,
            });
        }
        let entry = self.admit(id, position, value.into())?;
        self.attach(id, name, &entry);
        let replaced = std::mem::replace(&mut self.node_mut(id).slots[position].entries[index], entry);
        self.detach(replaced);
        Ok(())
    }

    /// Remove and return the entry at `index`, detaching it.
    pub fn slot_remove(&mut self, id: NodeId, name: SlotName, index: usize) -> Result<Entry> {
        let position = self.slot_position(id, name)?;
        let len = self.node(id).slots[position].len();
        if index >= len {
            return Err(Error::IndexOutOfBounds {
                slot: name,
                index,
                len,
            });
        }
        let entry = self.node_mut(id).slots[position].entries.remove(index);
        self.detach(entry.clone());
        Ok(entry)
    }

    /// Append a value to the main container of `host`, honoring any
    /// active scope redirect.
    ///
    /// Fails with [`Error::NoMainContainer`] on kinds that declare none,
    /// and with [`Error::TypeMismatch`] when the value (after optional
    /// conversion) is outside the target slot's admitted set.
    pub fn append(&mut self, host: NodeId, value: impl Into<Entry>) -> Result<()> {
        let (target, slot) = self.effective_target(host).ok_or(Error::NoMainContainer {
            kind: self.node(host).kind,
        })?;
        self.slot_push(target, slot, value)
    }

    /// Borrow the main container of `id`.
    pub fn main_container(&self, id: NodeId) -> Result<&TypedContainer> {
        let kind = self.node(id).kind;
        let slot = kind.main_container().ok_or(Error::NoMainContainer { kind })?;
        self.slot(id, slot)
    }

    fn slot_position(&self, id: NodeId, name: SlotName) -> Result<usize> {
        let node = self.node(id);
        node.slot_position(name).ok_or(Error::NoSuchSlot {
            kind: node.kind,
            slot: name,
        })
    }

    /// Validation: optional conversion, then type-set membership.
    fn admit(&mut self, id: NodeId, position: usize, value: Entry) -> Result<Entry> {
        let container = &self.node(id).slots[position];
        let oktypes = container.oktypes();
        let converter = container.converter;

        let entry = match (&value, converter) {
            (Entry::Str(s), Some(Converter::StrToInline)) => {
                let s = s.clone();
                Entry::Node(self.span(&s))
            }
            (Entry::Str(s), Some(Converter::StrToBlock)) => {
                let s = s.clone();
                Entry::Node(self.plain(&s))
            }
            _ => value,
        };

        let class = match &entry {
            Entry::Node(node) => self.node(*node).kind.class(),
            scalar => scalar
                .scalar_class()
                .unwrap_or_else(crate::tree::node::TypeSet::empty),
        };
        if !oktypes.intersects(class) {
            let actual = match &entry {
                Entry::Node(node) => self.node(*node).kind.tag().to_string(),
                Entry::Int(_) => "int".to_string(),
                Entry::Str(_) => "str".to_string(),
                Entry::Bool(_) => "bool".to_string(),
            };
            return Err(Error::TypeMismatch {
                actual,
                allowed: oktypes,
            });
        }
        Ok(entry)
    }

    /// Wire parent and location into a node entry. Scalars carry no back
    /// reference; inserting one is legal but logged, since navigation
    /// from it is impossible.
    fn attach(&mut self, owner: NodeId, slot: SlotName, entry: &Entry) {
        match entry {
            Entry::Node(id) => {
                let node = self.node_mut(*id);
                node.parent = Some(owner);
                node.location = Some(slot);
            }
            scalar => {
                debug!(owner = owner.0, %slot, value = %scalar, "scalar entry has no parent");
            }
        }
    }

    fn detach(&mut self, entry: Entry) {
        if let Entry::Node(id) = entry {
            let node = self.node_mut(id);
            node.parent = None;
            node.location = None;
        }
    }

    /// Attach and push without validation, for constructor-built children
    /// that are in-set by construction.
    fn attach_push(&mut self, owner: NodeId, slot: SlotName, entry: Entry) {
        self.attach(owner, slot, &entry);
        if let Some(position) = self.node(owner).slot_position(slot) {
            self.node_mut(owner).slots[position].entries.push(entry);
        }
    }

    // ======================================================================
    // Navigation
    // ======================================================================

    /// The node owning `id`, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The parent slot holding `id`, if attached.
    pub fn location(&self, id: NodeId) -> Option<SlotName> {
        self.node(id).location
    }

    /// The container holding `id`, if attached.
    pub fn container(&self, id: NodeId) -> Option<&TypedContainer> {
        let parent = self.node(id).parent?;
        let location = self.node(id).location?;
        self.slot(parent, location).ok()
    }

    /// Position of `id` among its siblings.
    pub fn index(&self, id: NodeId) -> Option<usize> {
        self.container(id)?.index_of(id)
    }

    /// The sibling `delta` positions away, or `None` when the computed
    /// position falls outside the container.
    pub fn offset(&self, id: NodeId, delta: isize) -> Option<NodeId> {
        let container = self.container(id)?;
        let position = container.index_of(id)? as isize + delta;
        if position < 0 || position as usize >= container.len() {
            return None;
        }
        container.node_at(position as usize)
    }

    /// The next sibling.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.offset(id, 1)
    }

    /// The previous sibling.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.offset(id, -1)
    }

    /// The document root above `id` (or `id` itself).
    pub fn document_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if self.node(current).kind == NodeKind::Document {
                return Some(current);
            }
            current = self.node(current).parent?;
        }
    }

    /// The wrap width configured on the document above `id`.
    pub fn textwidth(&self, id: NodeId) -> Option<usize> {
        self.document_of(id)
            .and_then(|doc| self.node(doc).textwidth)
    }

    /// Set the wrap width of a document node.
    pub fn set_textwidth(&mut self, doc: NodeId, textwidth: Option<usize>) {
        self.node_mut(doc).textwidth = textwidth;
    }
}
