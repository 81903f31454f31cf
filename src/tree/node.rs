//! Node kinds, type classes, and child-slot declarations.
//!
//! Every element kind declares its child slots in a `const` table
//! ([`KindSpec`]): slot name, the [`TypeSet`] of admissible children, an
//! optional string [`Converter`], and the separator used when the slot is
//! rendered. The tables replace the attribute-driven slot synthesis of
//! dynamic implementations with explicit, statically checked declarations.

use std::fmt;

use bitflags::bitflags;

use crate::tree::container::TypedContainer;
use crate::tree::scope::ScopeState;

/// Unique identifier for a node within a [`Tree`](crate::Tree).
///
/// Node ids are only minted by the owning tree and nodes are never
/// deallocated, so an id stays valid for the tree's lifetime. Parent
/// back-references are stored as ids, which keeps the tree free of
/// ownership cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Set of type classes admitted by a child slot.
    ///
    /// Mirrors the class hierarchy of the element vocabulary: every node
    /// kind belongs to exactly one class, and a slot's `oktypes` is the
    /// union of the classes it accepts. The scalar classes exist for
    /// ad-hoc containers holding leaf values; no element kind declares
    /// them in its slots.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeSet: u16 {
        const DOCUMENT = 1 << 0;
        const INLINE = 1 << 1;
        const BLOCK = 1 << 2;
        const SECTION = 1 << 3;
        const LIST_ITEM = 1 << 4;
        const ENUMERATED_ITEM = 1 << 5;
        const FIELD_ITEM = 1 << 6;
        const INT = 1 << 7;
        const STR = 1 << 8;
        const BOOL = 1 << 9;
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TypeSet, &str); 10] = [
            (TypeSet::DOCUMENT, "Document"),
            (TypeSet::INLINE, "Inline"),
            (TypeSet::BLOCK, "Block"),
            (TypeSet::SECTION, "Section"),
            (TypeSet::LIST_ITEM, "ListItem"),
            (TypeSet::ENUMERATED_ITEM, "EnumeratedListItem"),
            (TypeSet::FIELD_ITEM, "FieldListItem"),
            (TypeSet::INT, "int"),
            (TypeSet::STR, "str"),
            (TypeSet::BOOL, "bool"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Name of a declared child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotName {
    Content,
    Title,
    Term,
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotName::Content => "content",
            SlotName::Title => "title",
            SlotName::Term => "term",
        })
    }
}

/// Normalization applied to candidate slot values before type-checking.
///
/// Converts a bare string into the inline or block run it stands for, so
/// callers can write `tree.append(p, "some text")` against slots that
/// only admit element children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// `"a b"` → `Span(Str("a"), Space, Str("b"))`
    StrToInline,
    /// `"a b"` → `Plain(Str("a"), Space, Str("b"))`
    StrToBlock,
}

/// Declaration of one child slot of a node kind.
#[derive(Debug, Clone, Copy)]
pub struct SlotSpec {
    pub name: SlotName,
    pub oktypes: TypeSet,
    pub converter: Option<Converter>,
    /// Separator between rendered children of this slot.
    pub separator: &'static str,
}

impl SlotSpec {
    const fn new(name: SlotName, oktypes: TypeSet) -> Self {
        SlotSpec {
            name,
            oktypes,
            converter: None,
            separator: "",
        }
    }

    const fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    const fn separator(mut self, separator: &'static str) -> Self {
        self.separator = separator;
        self
    }
}

/// Static declaration table for a node kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    /// Declared child slots, in declaration (and rendering) order.
    pub slots: &'static [SlotSpec],
    /// The slot implicitly targeted by `append` and scoped insertion,
    /// if the kind supports them.
    pub main: Option<SlotName>,
}

const NO_SLOTS: KindSpec = KindSpec {
    slots: &[],
    main: None,
};

const INLINE_RUN: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::INLINE)],
    main: None,
};

const WRAPPED: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::INLINE)],
    main: Some(SlotName::Content),
};

const DOCUMENT: KindSpec = KindSpec {
    slots: &[SlotSpec::new(
        SlotName::Content,
        TypeSet::SECTION.union(TypeSet::BLOCK),
    )
    .separator("\n")],
    main: Some(SlotName::Content),
};

const PARAGRAPH: KindSpec = KindSpec {
    slots: &[
        SlotSpec::new(SlotName::Content, TypeSet::INLINE).converter(Converter::StrToInline),
    ],
    main: Some(SlotName::Content),
};

const PLAIN: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::INLINE)],
    main: Some(SlotName::Content),
};

const DIRECTIVE: KindSpec = KindSpec {
    slots: &[
        SlotSpec::new(SlotName::Title, TypeSet::INLINE),
        SlotSpec::new(SlotName::Content, TypeSet::BLOCK.union(TypeSet::SECTION)).separator("\n"),
    ],
    main: Some(SlotName::Content),
};

const SECTION: KindSpec = KindSpec {
    slots: &[
        SlotSpec::new(SlotName::Title, TypeSet::INLINE),
        SlotSpec::new(SlotName::Content, TypeSet::BLOCK).separator("\n"),
    ],
    main: Some(SlotName::Content),
};

const BULLET_LIST: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::LIST_ITEM).separator("\n")],
    main: Some(SlotName::Content),
};

const ENUMERATED_LIST: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::ENUMERATED_ITEM).separator("\n")],
    main: Some(SlotName::Content),
};

const FIELD_LIST: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::FIELD_ITEM).separator("\n")],
    main: Some(SlotName::Content),
};

const LIST_ITEM: KindSpec = KindSpec {
    slots: &[SlotSpec::new(SlotName::Content, TypeSet::BLOCK)
        .converter(Converter::StrToBlock)
        .separator("\n")],
    main: Some(SlotName::Content),
};

const FIELD_ITEM: KindSpec = KindSpec {
    slots: &[
        SlotSpec::new(SlotName::Term, TypeSet::INLINE),
        SlotSpec::new(SlotName::Content, TypeSet::BLOCK).separator("\n"),
    ],
    main: Some(SlotName::Content),
};

/// The element vocabulary.
///
/// Kinds map one-to-one onto reStructuredText concepts: inline runs
/// (`Str`, `Space`, `Emph`, …), block content (`Paragraph`, lists,
/// directives), section headers, and the `Document` root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Document root; holds sections and blocks, carries the textwidth.
    Document,
    /// A single space between inline words.
    Space,
    /// A hard line break inside inline content.
    LineBreak,
    /// Leaf text run; the actual string lives in the node data.
    Str,
    /// Neutral inline grouping.
    Span,
    /// `*emphasized*` inline.
    Emph,
    /// `**strong**` inline.
    Strong,
    /// Word-wrapped block of inline content.
    Paragraph,
    /// Unwrapped block of inline content.
    Plain,
    /// `.. name:: title` directive block with indented body.
    Directive,
    /// Document title: overlined and inset header.
    Title,
    /// Top-level section (`=` underline).
    Section,
    /// Second-level section (`-` underline).
    Subsection,
    /// Third-level section (`~` underline).
    Subsubsection,
    /// `- ` bulleted list.
    BulletList,
    /// Item of a bullet list.
    ListItem,
    /// `1. ` numbered list.
    EnumeratedList,
    /// Item of an enumerated list; renders its own number.
    EnumeratedListItem,
    /// `:term: value` field list.
    FieldList,
    /// Item of a field list; the term renders as the leader.
    FieldListItem,
}

impl NodeKind {
    /// The class this kind belongs to, for slot membership checks.
    pub fn class(self) -> TypeSet {
        use NodeKind::*;
        match self {
            Document => TypeSet::DOCUMENT,
            Space | LineBreak | Str | Span | Emph | Strong => TypeSet::INLINE,
            Paragraph | Plain | Directive | BulletList | EnumeratedList | FieldList => {
                TypeSet::BLOCK
            }
            Title | Section | Subsection | Subsubsection => TypeSet::SECTION,
            ListItem => TypeSet::LIST_ITEM,
            EnumeratedListItem => TypeSet::ENUMERATED_ITEM,
            FieldListItem => TypeSet::FIELD_ITEM,
        }
    }

    /// Static slot declarations for this kind.
    pub fn spec(self) -> &'static KindSpec {
        use NodeKind::*;
        match self {
            Document => &DOCUMENT,
            Space | LineBreak | Str => &NO_SLOTS,
            Span => &INLINE_RUN,
            Emph | Strong => &WRAPPED,
            Paragraph => &PARAGRAPH,
            Plain => &PLAIN,
            Directive => &DIRECTIVE,
            Title | Section | Subsection | Subsubsection => &SECTION,
            BulletList => &BULLET_LIST,
            EnumeratedList => &ENUMERATED_LIST,
            FieldList => &FIELD_LIST,
            ListItem | EnumeratedListItem => &LIST_ITEM,
            FieldListItem => &FIELD_ITEM,
        }
    }

    /// The slot implicitly targeted by `append` and scoped insertion.
    pub fn main_container(self) -> Option<SlotName> {
        self.spec().main
    }

    /// Whether this kind can host or join a `create` scope.
    pub fn supports_scoped_insertion(self) -> bool {
        self.spec().main.is_some()
    }

    /// Header character for section kinds.
    pub(crate) fn header_char(self) -> char {
        match self {
            NodeKind::Subsection => '-',
            NodeKind::Subsubsection => '~',
            _ => '=',
        }
    }

    /// Section kinds only: draw an overline above the title.
    pub(crate) fn overline(self) -> bool {
        self == NodeKind::Title
    }

    /// Section kinds only: pad the title with one space on each side
    /// before measuring the header length.
    pub(crate) fn inset(self) -> bool {
        self == NodeKind::Title
    }

    /// Tag used in diagnostics and structural snapshots.
    pub fn tag(self) -> &'static str {
        use NodeKind::*;
        match self {
            Document => "Document",
            Space => "Space",
            LineBreak => "LineBreak",
            Str => "Str",
            Span => "Span",
            Emph => "Emph",
            Strong => "Strong",
            Paragraph => "Paragraph",
            Plain => "Plain",
            Directive => "Directive",
            Title => "Title",
            Section => "Section",
            Subsection => "Subsection",
            Subsubsection => "Subsubsection",
            BulletList => "BulletList",
            ListItem => "ListItem",
            EnumeratedList => "EnumeratedList",
            EnumeratedListItem => "EnumeratedListItem",
            FieldList => "FieldList",
            FieldListItem => "FieldListItem",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Owning node (None while detached). Non-owning back-reference.
    pub parent: Option<NodeId>,
    /// Which slot of the parent holds this node.
    pub location: Option<SlotName>,
    /// Child slots, in declaration order.
    pub(crate) slots: Vec<TypedContainer>,
    /// `Str` text, or the directive name for `Directive` nodes.
    pub(crate) text: String,
    /// Wrap width; only meaningful on `Document` nodes.
    pub(crate) textwidth: Option<usize>,
    /// Scoped-mutation state, created lazily on first scoped use.
    pub(crate) scope: Option<Box<ScopeState>>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        let slots = kind
            .spec()
            .slots
            .iter()
            .map(TypedContainer::for_slot)
            .collect();
        NodeData {
            kind,
            parent: None,
            location: None,
            slots,
            text: String::new(),
            textwidth: None,
            scope: None,
        }
    }

    /// Text payload: the string of a `Str` node, or a directive's name.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Declared slots in declaration order.
    pub fn slots(&self) -> &[TypedContainer] {
        &self.slots
    }

    pub(crate) fn slot_position(&self, name: SlotName) -> Option<usize> {
        self.kind
            .spec()
            .slots
            .iter()
            .position(|spec| spec.name == name)
    }
}
