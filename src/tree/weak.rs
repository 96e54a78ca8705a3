//! Weak node references
//!
//! A [WeakNode] names a node without keeping it alive or claiming it as part of the tree. It
//! resolves only while the node is live and reachable from an anchored root. Detaching any
//! ancestor of the node makes the reference stale for as long as the subtree stays detached;
//! re-attaching it makes the reference resolve again. Removing the node makes it stale for good,
//! even if its slot is reused.

use crate::error::TreeResult;
use crate::tree::arena::{NodeId, Tree};

/// A non-owning reference to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakNode {
    id: NodeId,
}

impl WeakNode {
    /// The id this reference was taken from, whether or not it still resolves.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node, if it is still part of `tree`.
    pub fn upgrade<T>(&self, tree: &Tree<T>) -> Option<NodeId> {
        tree.is_attached(self.id).then_some(self.id)
    }

    /// The node's payload, if it is still part of `tree`.
    pub fn get<'a, T>(&self, tree: &'a Tree<T>) -> Option<&'a T> {
        self.upgrade(tree).and_then(|id| tree.get(id))
    }
}

impl<T> Tree<T> {
    /// Take a weak reference to a live node. The node need not be attached yet.
    pub fn downgrade(&self, id: NodeId) -> TreeResult<WeakNode> {
        self.check(id)?;
        Ok(WeakNode { id })
    }

    pub fn resolve(&self, weak: &WeakNode) -> Option<NodeId> {
        weak.upgrade(self)
    }
}
