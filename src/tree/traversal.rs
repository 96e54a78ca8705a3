//! Navigation and traversal
//!
//! All iterators here are lazy and borrow the tree, so they always see its current shape; a new
//! call after a mutation reflects the mutation. Passing a stale id yields `None` or an empty
//! iterator rather than an error.
//!
//! Traversal Orders
//!
//!     PreOrder      a node, then each child's subtree left to right (the default)
//!     PostOrder     each child's subtree left to right, then the node
//!     BreadthFirst  level by level, left to right
//!
//!     For `r(a(c), b)`: pre-order `r a c b`, post-order `c a b r`, breadth-first `r a b c`.

use crate::tree::arena::{NodeId, Tree};
use std::collections::VecDeque;
use std::iter::{FusedIterator, Rev};
use std::slice;

/// Order in which [Tree::traverse] and [Tree::find] visit a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Traversal {
    #[default]
    PreOrder,
    PostOrder,
    BreadthFirst,
}

/// Children of a node, in order.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    inner: slice::Iter<'a, NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for Children<'_> {}
impl FusedIterator for Children<'_> {}

/// Parent, grandparent and so on up to the root.
#[derive(Debug, Clone)]
pub struct Ancestors<'a, T> {
    tree: &'a Tree<T>,
    next: Option<NodeId>,
}

impl<T> Iterator for Ancestors<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

impl<T> FusedIterator for Ancestors<'_, T> {}

/// A subtree walk in a given [Traversal] order, starting node included.
#[derive(Debug, Clone)]
pub struct Traverse<'a, T> {
    tree: &'a Tree<T>,
    order: Traversal,
    /// Nodes still to visit; the flag marks post-order nodes whose children are already queued.
    pending: VecDeque<(NodeId, bool)>,
}

impl<T> Iterator for Traverse<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let tree = self.tree;
        match self.order {
            Traversal::PreOrder => {
                let (id, _) = self.pending.pop_back()?;
                self.pending
                    .extend(tree.children(id).rev().map(|child| (child, false)));
                Some(id)
            }
            Traversal::BreadthFirst => {
                let (id, _) = self.pending.pop_front()?;
                self.pending
                    .extend(tree.children(id).map(|child| (child, false)));
                Some(id)
            }
            Traversal::PostOrder => loop {
                let (id, expanded) = self.pending.pop_back()?;
                if expanded {
                    return Some(id);
                }
                self.pending.push_back((id, true));
                self.pending
                    .extend(tree.children(id).rev().map(|child| (child, false)));
            },
        }
    }
}

impl<T> FusedIterator for Traverse<'_, T> {}

impl<T> Tree<T> {
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let children = self.node(id).map_or(&[][..], |node| &node.children[..]);
        Children {
            inner: children.iter(),
        }
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id)
            .and_then(|node| node.children.get(index).copied())
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |node| node.children.len())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).next()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).next_back()
    }

    /// Position of `id` among its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).position(|child| child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.following_siblings(id).next()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id).next()
    }

    /// Siblings after `id`, nearest first.
    pub fn following_siblings(&self, id: NodeId) -> Children<'_> {
        match self.sibling_slice(id) {
            Some((siblings, index)) => Children {
                inner: siblings[index + 1..].iter(),
            },
            None => Children::empty(),
        }
    }

    /// Siblings before `id`, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> Rev<Children<'_>> {
        match self.sibling_slice(id) {
            Some((siblings, index)) => Children {
                inner: siblings[..index].iter(),
            }
            .rev(),
            None => Children::empty().rev(),
        }
    }

    fn sibling_slice(&self, id: NodeId) -> Option<(&[NodeId], usize)> {
        let parent = self.node(self.parent(id)?)?;
        let index = parent.children.iter().position(|&child| child == id)?;
        Some((&parent.children[..], index))
    }

    /// Parent, grandparent and so on; `id` itself is not included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// The root of the tree `id` currently belongs to (`id` itself for a root).
    pub fn toplevel(&self, id: NodeId) -> Option<NodeId> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).last().unwrap_or(id))
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).count())
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|node| node == ancestor)
    }

    /// The deepest node that is `a` or an ancestor of `a`, and `b` or an ancestor of `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let lineage: Vec<NodeId> = std::iter::once(a).chain(self.ancestors(a)).collect();
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|node| lineage.contains(node))
    }

    /// Whether `id` is reachable from an anchored root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.toplevel(id).is_some_and(|root| self.is_anchored(root))
    }

    /// Walk the subtree rooted at `start`, `start` included.
    pub fn traverse(&self, start: NodeId, order: Traversal) -> Traverse<'_, T> {
        let mut pending = VecDeque::new();
        if self.contains(start) {
            pending.push_back((start, false));
        }
        Traverse {
            tree: self,
            order,
            pending,
        }
    }

    /// Every node below `start`, in pre-order.
    pub fn descendants(&self, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.traverse(start, Traversal::PreOrder).skip(1)
    }

    /// The first node of the subtree at `start` whose payload satisfies `predicate`.
    pub fn find<P>(&self, start: NodeId, order: Traversal, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&T) -> bool,
    {
        self.traverse(start, order)
            .find(|&id| self.get(id).is_some_and(&mut predicate))
    }

    /// Every node of the subtree at `start` whose payload satisfies `predicate`, lazily.
    pub fn find_all<'a, P>(
        &'a self,
        start: NodeId,
        order: Traversal,
        mut predicate: P,
    ) -> impl Iterator<Item = NodeId> + 'a
    where
        P: FnMut(&T) -> bool + 'a,
    {
        self.traverse(start, order)
            .filter(move |&id| self.get(id).is_some_and(&mut predicate))
    }
}

impl Children<'_> {
    fn empty() -> Self {
        Children { inner: [].iter() }
    }
}
