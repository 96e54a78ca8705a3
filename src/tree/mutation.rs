//! Structural mutation
//!
//! Every operation here keeps two invariants:
//!
//!     - A node is a child of at most one parent, and its parent link names exactly the node
//!       whose child list holds it. Attaching a node that already has a parent detaches it first.
//!     - No node is its own ancestor. Attachments that would create a cycle are rejected with
//!       [TreeError::WouldCycle] before anything is changed.
//!
//! A failed single-node operation leaves the tree untouched: its arguments are validated before
//! the first write. [Tree::extend] attaches children one at a time, so a failure part way keeps
//! the children attached before it.

use crate::error::{TreeError, TreeResult};
use crate::tree::arena::{NodeId, Tree};
use std::ops::Range;
use tracing::trace;

impl<T> Tree<T> {
    /// Attach `child` at position `index` of `parent`'s children.
    ///
    /// `index` is a position in the resulting list: when `child` already sits under `parent`,
    /// this moves it.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        self.check_attach(parent, child)?;
        let len = self.attach_len(parent, child)?;
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }

        self.unlink(child)?;
        let node = self.try_node_mut(child)?;
        node.parent = Some(parent);
        node.anchored = false;
        self.try_node_mut(parent)?.children.insert(index, child);
        trace!(parent = %parent, child = %child, index, "attach");
        Ok(())
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.check_attach(parent, child)?;
        let len = self.attach_len(parent, child)?;
        self.insert(parent, len, child)
    }

    /// Append several children in order. Stops at the first failure; children appended before
    /// it stay attached.
    pub fn extend(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> TreeResult<()> {
        for child in children {
            self.append(parent, child)?;
        }
        Ok(())
    }

    /// Attach `node` right before `sibling`, under `sibling`'s parent.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) -> TreeResult<()> {
        self.insert_beside(sibling, node, 0)
    }

    /// Attach `node` right after `sibling`, under `sibling`'s parent.
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) -> TreeResult<()> {
        self.insert_beside(sibling, node, 1)
    }

    fn insert_beside(&mut self, sibling: NodeId, node: NodeId, offset: usize) -> TreeResult<()> {
        self.check(node)?;
        let parent = self
            .try_node(sibling)?
            .parent
            .ok_or(TreeError::NoParent(sibling))?;
        if node == sibling {
            return Ok(());
        }
        self.check_attach(parent, node)?;

        let siblings = &self.try_node(parent)?.children;
        let mut index = position(siblings, sibling).ok_or(TreeError::StaleNode(sibling))?;
        if let Some(current) = position(siblings, node) {
            if current < index {
                index -= 1;
            }
        }
        self.insert(parent, index + offset, node)
    }

    /// Detach `node` from its parent. Detaching a root does nothing.
    pub fn detach(&mut self, node: NodeId) -> TreeResult<()> {
        self.check(node)?;
        if self.unlink(node)?.is_some() {
            trace!(node = %node, "detach");
        }
        Ok(())
    }

    /// Detach all children of `parent`, returning them in their former order.
    pub fn clear(&mut self, parent: NodeId) -> TreeResult<Vec<NodeId>> {
        let len = self.try_node(parent)?.children.len();
        self.take(parent, 0..len)
    }

    /// Detach the children of `parent` in `range`, returning them in their former order.
    pub fn take(&mut self, parent: NodeId, range: Range<usize>) -> TreeResult<Vec<NodeId>> {
        let len = self.try_node(parent)?.children.len();
        if range.start > range.end || range.end > len {
            return Err(TreeError::IndexOutOfBounds {
                index: range.end.max(range.start),
                len,
            });
        }

        let taken: Vec<NodeId> = self.try_node_mut(parent)?.children.drain(range).collect();
        for &child in &taken {
            self.try_node_mut(child)?.parent = None;
        }
        trace!(parent = %parent, count = taken.len(), "take");
        Ok(taken)
    }

    /// Put `new` where `old` is, in one step.
    ///
    /// `new` is detached from wherever it was first. If `old` is a root, `new` becomes a root
    /// and inherits `old`'s anchor. Afterwards `old` is a detached, unanchored root.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> TreeResult<()> {
        self.check(old)?;
        self.check(new)?;
        if old == new {
            return Ok(());
        }
        if self.is_descendant_of(old, new) {
            return Err(TreeError::WouldCycle {
                parent: old,
                child: new,
            });
        }

        self.unlink(new)?;
        let old_node = self.try_node_mut(old)?;
        match old_node.parent.take() {
            Some(parent) => {
                let siblings = &mut self.try_node_mut(parent)?.children;
                let index = position(siblings, old).ok_or(TreeError::StaleNode(old))?;
                siblings[index] = new;
                let new_node = self.try_node_mut(new)?;
                new_node.parent = Some(parent);
                new_node.anchored = false;
            }
            None => {
                let anchored = std::mem::replace(&mut old_node.anchored, false);
                self.try_node_mut(new)?.anchored = anchored;
            }
        }
        trace!(old = %old, new = %new, "replace");
        Ok(())
    }

    /// Detach `node` and free it together with its whole subtree, returning its payload.
    ///
    /// Ids and weak references into the subtree go stale for good.
    pub fn remove(&mut self, node: NodeId) -> TreeResult<T> {
        self.check(node)?;
        self.unlink(node)?;

        let mut payload = None;
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            let data = self.release(current)?;
            pending.extend(data.children.iter().copied());
            if current == node {
                payload = Some(data.payload);
            }
        }
        trace!(node = %node, "remove");
        payload.ok_or(TreeError::StaleNode(node))
    }

    /// Free every node not reachable from an anchored root. Returns how many were freed.
    pub fn prune(&mut self) -> usize {
        let mut live = vec![false; self.capacity()];
        let roots: Vec<NodeId> = self.roots().collect();
        let mut pending = roots;
        while let Some(id) = pending.pop() {
            live[id.index()] = true;
            if let Some(node) = self.node(id) {
                pending.extend(node.children.iter().copied());
            }
        }

        let dead: Vec<NodeId> = self.ids().filter(|id| !live[id.index()]).collect();
        let mut freed = 0;
        for id in dead {
            if self.release(id).is_ok() {
                freed += 1;
            }
        }
        trace!(freed, "prune");
        freed
    }

    /// Build a detached copy of the subtree rooted at `node`.
    pub fn deep_copy(&mut self, node: NodeId) -> TreeResult<NodeId>
    where
        T: Clone,
    {
        let payload = self.try_node(node)?.payload.clone();
        let copy = self.new_node(payload);

        let mut pending = vec![(node, copy)];
        while let Some((source, target)) = pending.pop() {
            let children = self.try_node(source)?.children.clone();
            for child in children {
                let payload = self.try_node(child)?.payload.clone();
                let duplicate = self.new_node(payload);
                self.try_node_mut(duplicate)?.parent = Some(target);
                self.try_node_mut(target)?.children.push(duplicate);
                pending.push((child, duplicate));
            }
        }
        Ok(copy)
    }

    /// Reject attachments that would make `child` its own ancestor.
    fn check_attach(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.check(parent)?;
        self.check(child)?;
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        Ok(())
    }

    /// Length of `parent`'s child list once `child` has been detached from it.
    fn attach_len(&self, parent: NodeId, child: NodeId) -> TreeResult<usize> {
        let len = self.try_node(parent)?.children.len();
        let moving_within = self.try_node(child)?.parent == Some(parent);
        Ok(len - usize::from(moving_within))
    }

    /// Remove `node` from its parent's child list. Returns the former parent and position.
    fn unlink(&mut self, node: NodeId) -> TreeResult<Option<(NodeId, usize)>> {
        let Some(parent) = self.try_node_mut(node)?.parent.take() else {
            return Ok(None);
        };
        let siblings = &mut self.try_node_mut(parent)?.children;
        let index = position(siblings, node).ok_or(TreeError::StaleNode(node))?;
        siblings.remove(index);
        Ok(Some((parent, index)))
    }
}

fn position(siblings: &[NodeId], node: NodeId) -> Option<usize> {
    siblings.iter().position(|&id| id == node)
}
