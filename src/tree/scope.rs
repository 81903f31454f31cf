//! Scoped tree mutation: `create`, `append_later`, and `root`.
//!
//! A `create` scope temporarily retargets a node's main container at a
//! descendant's, so that appends against the host land inside the child
//! being built. The per-node state is explicit: a stack of saved
//! main-container targets plus a depth-indexed queue of deferred appends.
//! Exit steps (restore, append the child, flush the queue) run even when
//! the scope body bails out early with an error, so the tree is left
//! structurally consistent either way.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::tree::container::Entry;
use crate::tree::node::{NodeId, SlotName};
use crate::tree::Tree;

/// A main-container target: the node and slot that `append` resolves to.
pub(crate) type MainTarget = (NodeId, SlotName);

/// Per-node scoped-mutation state, created lazily on first scoped use.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeState {
    /// Saved targets, one per open scope; `saved.len()` is the nesting depth.
    pub(crate) saved: Vec<MainTarget>,
    /// Active redirect, if a scope is open. `None` means appends resolve
    /// to the node's own main container.
    pub(crate) redirect: Option<MainTarget>,
    /// Deferred appends, keyed by the depth at which they flush. Entries
    /// registered for a depth that is never reached again are dropped.
    pub(crate) pending: BTreeMap<isize, Vec<Entry>>,
}

impl Tree {
    /// Open a scope on `host` that builds inside `child`.
    ///
    /// While the scope body runs, [`append`](Tree::append) calls against
    /// `host` land in `child`'s main container. On exit — normal or early —
    /// the previous target is restored, `child` itself is appended through
    /// it, and deferred entries registered for the resulting depth flush in
    /// registration order.
    ///
    /// Both `host` and `child` must be kinds that declare a main container;
    /// otherwise this fails with [`Error::NoMainContainer`] before touching
    /// the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rstree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let doc = tree.document(None);
    /// let section = tree.section("Usage");
    /// tree.create(doc, section, |t| {
    ///     let p = t.paragraph("Inside the section.");
    ///     t.append(doc, p)
    /// })?;
    /// # Ok::<(), rstree::Error>(())
    /// ```
    pub fn create<R>(
        &mut self,
        host: NodeId,
        child: NodeId,
        body: impl FnOnce(&mut Tree) -> Result<R>,
    ) -> Result<R> {
        let host_main = self.require_main_container(host)?;
        self.require_main_container(child)?;

        let prev = self.effective_target(host).unwrap_or((host, host_main));
        let child_target = (child, self.node(child).kind.main_container().unwrap_or(host_main));
        {
            let scope = self.scope_mut(host);
            scope.saved.push(prev);
            scope.redirect = Some(child_target);
        }
        trace!(host = host.0, child = child.0, "create scope opened");

        let result = body(self);

        let depth = {
            let scope = self.scope_mut(host);
            let restored = scope.saved.pop().unwrap_or((host, host_main));
            scope.redirect = if restored == (host, host_main) {
                None
            } else {
                Some(restored)
            };
            scope.saved.len()
        };
        let mut exit = self.append(host, child);
        let queued = self
            .scope_mut(host)
            .pending
            .remove(&(depth as isize))
            .unwrap_or_default();
        for entry in queued {
            let appended = self.append(host, entry);
            if exit.is_ok() {
                exit = appended;
            }
        }
        trace!(host = host.0, depth, "create scope closed");

        match result {
            Ok(value) => exit.map(|_| value),
            Err(err) => Err(err),
        }
    }

    /// Register `value` to be appended to `host` once the scope stack
    /// unwinds back to nesting depth `depth`.
    ///
    /// A negative `depth` is relative to the depth at registration time,
    /// so `-1` targets the scope enclosing the current one. Lets a caller
    /// positioned deep inside nested `create` blocks schedule content for
    /// an ancestor scope without threading a reference to it.
    pub fn append_later(&mut self, host: NodeId, value: impl Into<Entry>, depth: isize) {
        let current = self.scope_depth(host) as isize;
        let key = if depth < 0 { current + depth } else { depth };
        debug!(host = host.0, depth = key, "deferred append registered");
        self.scope_mut(host)
            .pending
            .entry(key)
            .or_default()
            .push(value.into());
    }

    /// Re-enter the saved container at stack position `depth`, making
    /// appends against `host` land in that ancestor scope for the duration
    /// of `body`. The body receives the node owning the target container.
    pub fn root<R>(
        &mut self,
        host: NodeId,
        depth: usize,
        body: impl FnOnce(&mut Tree, NodeId) -> Result<R>,
    ) -> Result<R> {
        let host_main = self.require_main_container(host)?;
        let current = self.scope_depth(host);
        let target = self
            .node(host)
            .scope
            .as_ref()
            .and_then(|scope| scope.saved.get(depth).copied())
            .ok_or(Error::ScopeDepth { depth, current })?;

        let prev = self.effective_target(host).unwrap_or((host, host_main));
        {
            let scope = self.scope_mut(host);
            scope.saved.push(prev);
            scope.redirect = Some(target);
        }

        let result = body(self, target.0);

        let scope = self.scope_mut(host);
        let restored = scope.saved.pop().unwrap_or((host, host_main));
        scope.redirect = if restored == (host, host_main) {
            None
        } else {
            Some(restored)
        };
        result
    }

    /// Current scope nesting depth of `host`.
    pub fn scope_depth(&self, id: NodeId) -> usize {
        self.node(id)
            .scope
            .as_ref()
            .map(|scope| scope.saved.len())
            .unwrap_or(0)
    }

    pub(crate) fn scope_mut(&mut self, id: NodeId) -> &mut ScopeState {
        self.node_mut(id).scope.get_or_insert_default()
    }

    /// Where `append` against `id` currently lands: the active redirect,
    /// or the node's own main container.
    pub(crate) fn effective_target(&self, id: NodeId) -> Option<MainTarget> {
        let node = self.node(id);
        if let Some(scope) = &node.scope
            && let Some(target) = scope.redirect
        {
            return Some(target);
        }
        node.kind.main_container().map(|slot| (id, slot))
    }

    fn require_main_container(&self, id: NodeId) -> Result<SlotName> {
        let kind = self.node(id).kind;
        kind.main_container()
            .ok_or(Error::NoMainContainer { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::NodeKind;

    #[test]
    fn create_restores_target_on_normal_exit() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let section = tree.section("S");

        tree.create(doc, section, |t| {
            let p = t.paragraph("inside");
            t.append(doc, p)
        })
        .unwrap();

        assert_eq!(tree.effective_target(doc), Some((doc, SlotName::Content)));
        // The paragraph landed in the section, the section in the document.
        assert_eq!(tree.slot(doc, SlotName::Content).unwrap().len(), 1);
        assert_eq!(tree.slot(section, SlotName::Content).unwrap().len(), 1);
    }

    #[test]
    fn create_restores_target_on_error_exit() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let section = tree.section("S");
        let stray = tree.space();

        let result = tree.create(doc, section, |t| {
            // Spaces are Inline; the section body only takes blocks.
            t.append(doc, stray)
        });
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));

        // The scope unwound: target restored, child appended exactly once.
        assert_eq!(tree.effective_target(doc), Some((doc, SlotName::Content)));
        let content = tree.slot(doc, SlotName::Content).unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content.node_at(0), Some(section));
    }

    #[test]
    fn create_requires_main_containers_on_both_sides() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let word = tree.text("x");

        let err = tree.create(doc, word, |_| Ok(())).unwrap_err();
        assert!(matches!(
            err,
            Error::NoMainContainer {
                kind: NodeKind::Str
            }
        ));
    }

    #[test]
    fn append_later_flushes_in_registration_order() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let section = tree.section("S");
        let first = tree.paragraph("first");
        let second = tree.paragraph("second");

        tree.create(doc, section, |t| {
            t.append_later(doc, first, 0);
            t.append_later(doc, second, 0);
            Ok(())
        })
        .unwrap();

        let content = tree.slot(doc, SlotName::Content).unwrap();
        assert_eq!(content.node_at(0), Some(section));
        assert_eq!(content.node_at(1), Some(first));
        assert_eq!(content.node_at(2), Some(second));
    }

    #[test]
    fn append_later_negative_depth_is_relative() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let outer = tree.section("Outer");
        let deferred = tree.paragraph("deferred");

        tree.create(doc, outer, |t| {
            // Depth is 1 here, so -1 resolves to depth 0: flush when the
            // outer scope closes.
            t.append_later(doc, deferred, -1);
            Ok(())
        })
        .unwrap();

        let content = tree.slot(doc, SlotName::Content).unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content.node_at(1), Some(deferred));
    }

    #[test]
    fn root_reenters_the_saved_scope() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let section = tree.section("S");
        let escaped = tree.paragraph("escaped");
        let inside = tree.paragraph("inside");

        tree.create(doc, section, |t| {
            t.root(doc, 0, |t, owner| {
                assert_eq!(owner, doc);
                t.append(doc, escaped)
            })?;
            t.append(doc, inside)
        })
        .unwrap();

        let content = tree.slot(doc, SlotName::Content).unwrap();
        // The escaped paragraph was appended to the document before the
        // section itself (the section lands on scope exit).
        assert_eq!(content.node_at(0), Some(escaped));
        assert_eq!(content.node_at(1), Some(section));
        assert_eq!(tree.slot(section, SlotName::Content).unwrap().node_at(0), Some(inside));
    }

    #[test]
    fn root_outside_any_scope_fails() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let err = tree.root(doc, 0, |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::ScopeDepth { depth: 0, current: 0 }));
    }

    #[test]
    fn nested_scopes_flush_at_their_own_depths() {
        let mut tree = Tree::new();
        let doc = tree.document(None);
        let outer = tree.section("Outer");
        let inner = tree.subsection("Inner");
        let after_outer = tree.paragraph("after outer");

        tree.create(doc, outer, |t| {
            t.create(doc, inner, |t| {
                t.append_later(doc, after_outer, 0);
                Ok(())
            })
        })
        .unwrap();

        // Registered for depth 0, so it flushed after the outer scope
        // closed, landing in the document rather than in a section.
        let content = tree.slot(doc, SlotName::Content).unwrap();
        assert_eq!(content.node_at(0), Some(outer));
        assert_eq!(content.node_at(1), Some(after_outer));
    }
}
