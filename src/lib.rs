//! Build reStructuredText documents programmatically as typed node trees.
//!
//! Documents are assembled from an element vocabulary (titles, sections,
//! paragraphs, lists, inline emphasis) held in an arena-backed [`Tree`].
//! Child slots are typed: inserting a value outside a slot's admitted
//! classes fails with a descriptive error instead of producing broken
//! markup. Rendering with [`Tree::dump`] is deterministic and pure.
//!
//! # Example
//!
//! ```
//! use rstree::Tree;
//!
//! let mut tree = Tree::new();
//! let doc = tree.document(None);
//! let title = tree.title("My document");
//! tree.append(doc, title)?;
//!
//! let section = tree.section("Overview");
//! tree.create(doc, section, |t| {
//!     let para = t.paragraph("All about the thing.");
//!     t.append(doc, para)
//! })?;
//!
//! assert_eq!(
//!     tree.dump(doc),
//!     "=============\n My document \n=============\n\n\nOverview\n========\nAll about the thing.\n"
//! );
//! # Ok::<(), rstree::Error>(())
//! ```
//!
//! Scoped insertion (`create`) retargets appends into the element being
//! built, so nested structure reads top-down; `append_later` schedules
//! content for an enclosing scope, and `root` temporarily re-enters one.

pub mod error;
pub mod outline;
mod render;
pub mod tree;

pub use error::{Error, Result};
pub use outline::Outline;
pub use tree::container::{Entry, TypedContainer};
pub use tree::node::{Converter, NodeData, NodeId, NodeKind, SlotName, TypeSet};
pub use tree::Tree;
