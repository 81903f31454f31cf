//! Structural snapshots of a subtree.
//!
//! An [`Outline`] is a plain, render-free view of the tree shape: node
//! tags, text payloads, and children in slot-declaration order. With the
//! `serde` feature it serializes, giving downstream tooling a
//! machine-readable form of the document structure.

use crate::tree::container::Entry;
use crate::tree::node::NodeId;
use crate::tree::Tree;

/// One node of a structural snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outline {
    /// Node kind tag, or `int`/`str`/`bool` for scalar entries.
    pub tag: String,
    /// Text payload: the string of a text run, a directive's name, or a
    /// scalar's display form.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub text: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<Outline>,
}

impl Tree {
    /// Snapshot the structure of the subtree rooted at `id`.
    pub fn outline(&self, id: NodeId) -> Outline {
        let node = self.node(id);
        let children = node
            .slots()
            .iter()
            .flat_map(|slot| slot.iter())
            .map(|entry| match entry {
                Entry::Node(child) => self.outline(*child),
                Entry::Int(n) => Outline::scalar("int", n.to_string()),
                Entry::Str(s) => Outline::scalar("str", s.clone()),
                Entry::Bool(b) => Outline::scalar("bool", b.to_string()),
            })
            .collect();
        Outline {
            tag: node.kind.tag().to_string(),
            text: node.text().to_string(),
            children,
        }
    }
}

impl Outline {
    fn scalar(tag: &str, text: String) -> Outline {
        Outline {
            tag: tag.to_string(),
            text,
            children: Vec::new(),
        }
    }
}
