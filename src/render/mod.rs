//! Tree-to-text rendering.
//!
//! [`Tree::dump`] walks a subtree and produces its reStructuredText form.
//! Rendering is pure: it borrows the tree immutably, consults only node
//! data and positions, and yields identical output on repeated calls.
//!
//! Layout conventions:
//! - a document joins its children with single newlines;
//! - section headers are underlined (and the document title overlined)
//!   with a bar as wide as the title;
//! - blocks after the first sibling open with a blank line;
//! - list items wrap their body against the document's textwidth minus
//!   the indent accumulated from enclosing items and directives.

mod wrap;

use crate::tree::container::Entry;
use crate::tree::node::{NodeId, NodeKind, SlotName, TypeSet};
use crate::tree::Tree;
use wrap::{fill, wrap};

impl Tree {
    /// Render the subtree rooted at `id` to text.
    ///
    /// # Examples
    ///
    /// ```
    /// use rstree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let emph = tree.emph("really");
    /// assert_eq!(tree.dump(emph), "*really*");
    /// ```
    pub fn dump(&self, id: NodeId) -> String {
        use NodeKind::*;
        match self.kind(id) {
            Document => self.render_slot(id, SlotName::Content),
            Space => " ".to_string(),
            LineBreak => "\n".to_string(),
            Str => self.node(id).text().to_string(),
            Span | Plain => self.render_slot(id, SlotName::Content),
            Emph => format!("*{}*", self.render_slot(id, SlotName::Content)),
            Strong => format!("**{}**", self.render_slot(id, SlotName::Content)),
            Paragraph => self.dump_paragraph(id),
            Directive => self.dump_directive(id),
            Title | Section | Subsection | Subsubsection => self.dump_section(id),
            BulletList | EnumeratedList | FieldList => {
                format!("\n{}\n", self.render_slot(id, SlotName::Content))
            }
            ListItem | EnumeratedListItem | FieldListItem => self.dump_item(id),
        }
    }

    /// Join the rendered entries of a slot with its declared separator.
    /// An undeclared slot renders as empty.
    fn render_slot(&self, id: NodeId, name: SlotName) -> String {
        let kind = self.kind(id);
        let Ok(container) = self.slot(id, name) else {
            return String::new();
        };
        let separator = kind
            .spec()
            .slots
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.separator)
            .unwrap_or("");
        let parts: Vec<String> = container
            .iter()
            .map(|entry| match entry {
                Entry::Node(child) => self.dump(*child),
                scalar => scalar.to_string(),
            })
            .collect();
        parts.join(separator)
    }

    fn dump_paragraph(&self, id: NodeId) -> String {
        let mut content = self.render_slot(id, SlotName::Content);
        let fill_context = self
            .parent(id)
            .map(|parent| self.kind(parent).class())
            .is_some_and(|class| class.intersects(TypeSet::DOCUMENT | TypeSet::SECTION));
        if fill_context && let Some(width) = self.textwidth(id) {
            content = fill(&content, Some(width));
        }
        match self.index(id) {
            Some(index) if index > 0 => format!("\n{content}"),
            _ => content,
        }
    }

    fn dump_section(&self, id: NodeId) -> String {
        let kind = self.kind(id);
        let mut title = self.render_slot(id, SlotName::Title);
        if kind.inset() {
            title = format!(" {title} ");
        }
        let bar: String = std::iter::repeat_n(kind.header_char(), title.chars().count()).collect();
        let header = if kind.overline() {
            format!("{bar}\n{title}\n{bar}\n")
        } else {
            format!("{title}\n{bar}\n")
        };

        let has_body = self
            .slot(id, SlotName::Content)
            .map(|container| !container.is_empty())
            .unwrap_or(false);
        let mut out = if has_body {
            format!("{header}{}\n", self.render_slot(id, SlotName::Content))
        } else {
            header
        };
        if matches!(self.index(id), Some(index) if index > 0) {
            out = format!("\n{out}");
        }
        out
    }

    fn dump_directive(&self, id: NodeId) -> String {
        let header = format!(
            ".. {}:: {}",
            self.node(id).text(),
            self.render_slot(id, SlotName::Title)
        );
        let has_body = self
            .slot(id, SlotName::Content)
            .map(|container| !container.is_empty())
            .unwrap_or(false);
        let mut out = if has_body {
            let indent = " ".repeat(self.content_indent(id));
            let body = self.wrap_body(id, &indent, &indent);
            format!("{header}\n\n{body}")
        } else {
            header
        };
        if matches!(self.index(id), Some(index) if index > 0) {
            out = format!("\n{out}");
        }
        out
    }

    fn dump_item(&self, id: NodeId) -> String {
        let leader = self.leader(id);
        let indent = " ".repeat(self.content_indent(id));
        self.wrap_body(id, &leader, &indent)
    }

    /// Render the content slot, then wrap each of its lines. The first
    /// line gets `initial`, every other line the plain indent; the wrap
    /// width is the textwidth minus the indent of enclosing items.
    fn wrap_body(&self, id: NodeId, initial: &str, indent: &str) -> String {
        let body = self.render_slot(id, SlotName::Content);
        let width = self
            .textwidth(id)
            .map(|w| w.saturating_sub(self.ancestor_indent(id)));
        let wrapped: Vec<String> = body
            .lines()
            .enumerate()
            .map(|(line_number, line)| {
                let first = if line_number == 0 { initial } else { indent };
                wrap(line, width, first, indent).join("\n")
            })
            .collect();
        wrapped.join("\n")
    }

    /// The leader drawn before an item's first line.
    fn leader(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::EnumeratedListItem => {
                let number = self.index(id).unwrap_or(0) + 1;
                let align = self
                    .content_indent(id)
                    .saturating_sub(number / 10)
                    .saturating_sub(2);
                format!("{number}.{:align$}", "")
            }
            NodeKind::FieldListItem => {
                format!(":{}: ", self.render_slot(id, SlotName::Term))
            }
            _ => "- ".to_string(),
        }
    }

    /// Columns this node indents its own content by.
    fn content_indent(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::ListItem => 2,
            NodeKind::Directive => 3,
            // Reserve an extra column once the list reaches ten items.
            NodeKind::EnumeratedListItem => {
                let siblings = self.container(id).map(|c| c.len()).unwrap_or(0);
                siblings / 10 + 3
            }
            // The field body aligns under the term unless the leader is
            // too wide to hang content from.
            NodeKind::FieldListItem => {
                let leader_width = self.leader(id).chars().count();
                if leader_width > 7 { 3 } else { leader_width }
            }
            _ => 0,
        }
    }

    /// Indent accumulated by the ancestors of `id`, up to the document.
    fn ancestor_indent(&self, id: NodeId) -> usize {
        let mut total = 0;
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.kind(node) == NodeKind::Document {
                break;
            }
            total += self.content_indent(node);
            current = self.parent(node);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_runs_render_flat() {
        let mut tree = Tree::new();
        let span = tree.span("a few words");
        assert_eq!(tree.dump(span), "a few words");
        let emph = tree.emph("x");
        assert_eq!(tree.dump(emph), "*x*");
        let strong = tree.strong("x");
        assert_eq!(tree.dump(strong), "**x**");
    }

    #[test]
    fn standalone_paragraph_renders_bare() {
        let mut tree = Tree::new();
        let para = tree.paragraph("This is a paragraph.");
        assert_eq!(tree.dump(para), "This is a paragraph.");
    }

    #[test]
    fn title_is_overlined_and_inset() {
        let mut tree = Tree::new();
        let title = tree.title("This is a title");
        assert_eq!(
            tree.dump(title),
            "=================\n This is a title \n=================\n"
        );
    }

    #[test]
    fn section_levels_pick_their_header_chars() {
        let mut tree = Tree::new();
        let section = tree.section("Top");
        assert_eq!(tree.dump(section), "Top\n===\n");
        let sub = tree.subsection("Sub");
        assert_eq!(tree.dump(sub), "Sub\n---\n");
        let subsub = tree.subsubsection("Deep");
        assert_eq!(tree.dump(subsub), "Deep\n~~~~\n");
    }

    #[test]
    fn paragraph_wraps_only_under_document_or_section_with_width() {
        let mut tree = Tree::new();
        let doc = tree.document(Some(20));
        let para = tree.paragraph("one two three four five six");
        tree.append(doc, para).unwrap();
        assert_eq!(tree.dump(doc), "one two three four\nfive six");

        // Without a width the same layout renders unwrapped.
        tree.set_textwidth(doc, None);
        assert_eq!(tree.dump(doc), "one two three four five six");
    }

    #[test]
    fn bullet_list_wraps_item_bodies() {
        let mut tree = Tree::new();
        let doc = tree.document(Some(30));
        let list = tree.bullet_list();
        let one = tree.list_item("one");
        let two = tree.list_item("two long item that will be wrapped maybe");
        tree.append(list, one).unwrap();
        tree.append(list, two).unwrap();
        tree.append(doc, list).unwrap();
        assert_eq!(
            tree.dump(doc),
            "\n- one\n- two long item that will be\n  wrapped maybe\n"
        );
    }

    #[test]
    fn enumerated_list_aligns_numbers_past_nine_items() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let list = tree.enumerated_list();
        for n in 1..=11 {
            let item = tree.enumerated_item(&format!("item {n}"));
            tree.append(list, item).unwrap();
        }
        tree.append(doc, list).unwrap();
        let out = tree.dump(doc);
        assert!(out.starts_with("\n1.  item 1\n2.  item 2\n"));
        assert!(out.contains("\n9.  item 9\n10. item 10\n11. item 11\n"));
    }

    #[test]
    fn field_list_hangs_or_falls_back_by_term_width() {
        let mut tree = Tree::new();
        let doc = tree.document(Some(30));
        let list = tree.field_list();
        let wide = tree.field_item(
            "averylongterm",
            "some value that is long enough to wrap at small width",
        );
        tree.append(list, wide).unwrap();
        tree.append(doc, list).unwrap();
        assert_eq!(
            tree.dump(doc),
            "\n:averylongterm: some value\n   that is long enough to wrap\n   at small width\n"
        );

        let mut tree = Tree::new();
        let doc = tree.document(Some(30));
        let list = tree.field_list();
        let narrow = tree.field_item(
            "nm",
            "some value that is long enough to wrap at small width",
        );
        tree.append(list, narrow).unwrap();
        tree.append(doc, list).unwrap();
        assert_eq!(
            tree.dump(doc),
            "\n:nm: some value that is long\n     enough to wrap at small\n     width\n"
        );
    }

    #[test]
    fn nested_lists_accumulate_indent() {
        let mut tree = Tree::new();
        let doc = tree.document(Some(20));
        let outer_list = tree.bullet_list();
        let outer_item = tree.list_item("outer");
        let inner_list = tree.bullet_list();
        let inner_a = tree.list_item("inner one two three four");
        let inner_b = tree.list_item("b");
        tree.append(inner_list, inner_a).unwrap();
        tree.append(inner_list, inner_b).unwrap();
        tree.append(outer_item, inner_list).unwrap();
        tree.append(outer_list, outer_item).unwrap();
        tree.append(doc, outer_list).unwrap();
        assert_eq!(
            tree.dump(doc),
            "\n- outer\n\n  - inner one two\n    three four\n  - b\n"
        );
    }

    #[test]
    fn directive_renders_header_and_indented_body() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let first = tree.paragraph("before");
        let directive = tree.directive("note", "Watch out");
        let body = tree.paragraph("The body text.");
        tree.append(directive, body).unwrap();
        tree.append(doc, first).unwrap();
        tree.append(doc, directive).unwrap();
        assert_eq!(
            tree.dump(doc),
            "before\n\n.. note:: Watch out\n\n   The body text."
        );
    }

    #[test]
    fn empty_directive_is_just_the_header() {
        let mut tree = Tree::new();
        let directive = tree.directive("class", "special");
        assert_eq!(tree.dump(directive), ".. class:: special");
    }

    #[test]
    fn dump_is_deterministic() {
        let mut tree = Tree::new();
        let doc = tree.document(Some(30));
        let section = tree.section("S");
        let para = tree.paragraph("some repeated content here");
        tree.create(doc, section, |t| t.append(doc, para)).unwrap();
        let first = tree.dump(doc);
        let second = tree.dump(doc);
        assert_eq!(first, second);
    }
}
