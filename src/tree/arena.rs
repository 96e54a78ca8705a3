//! Node storage
//!
//! Nodes live in slots of a [Tree]. A [NodeId] names a slot together with the generation the
//! slot had when the node was created; freeing a slot bumps its generation, so an id outliving
//! its node is detected instead of silently naming whatever reuses the slot. Ids also carry the
//! identity of the tree that issued them.
//!
//! Parent links are ids as well. Nothing in the tree owns anything through a pointer, so there
//! are no reference cycles between a node and its parent, and removing a node is a matter of
//! freeing slots.

use crate::error::{TreeError, TreeResult};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to a node of a [Tree].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u32,
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index, stable for the lifetime of the node.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData<T> {
    pub(crate) payload: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Only ever set on roots.
    pub(crate) anchored: bool,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    node: Option<NodeData<T>>,
}

/// An arena of nodes forming any number of trees.
///
/// Roots created with [Tree::new_root] (or [anchored](Tree::anchor) later) define which nodes
/// count as part of the tree: weak references resolve only to nodes reachable from an anchored
/// root, and [Tree::prune] frees everything else. Cloning a tree keeps its identity, so ids
/// issued by the original are valid in the clone.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `id` names a live node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Create a detached, unanchored node.
    pub fn new_node(&mut self, payload: T) -> NodeId {
        let data = NodeData {
            payload,
            parent: None,
            children: Vec::new(),
            anchored: false,
        };
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(data);
                NodeId {
                    tree: self.id,
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(data),
                });
                NodeId {
                    tree: self.id,
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Create an anchored root.
    pub fn new_root(&mut self, payload: T) -> NodeId {
        let id = self.new_node(payload);
        if let Some(node) = self.node_mut(id) {
            node.anchored = true;
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.payload)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.payload)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Whether `id` is a live node without a parent.
    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.parent.is_none())
    }

    pub fn is_anchored(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.anchored)
    }

    /// Mark a root as part of the tree.
    pub fn anchor(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.try_node_mut(id)?;
        if node.parent.is_some() {
            return Err(TreeError::Attached(id));
        }
        node.anchored = true;
        Ok(())
    }

    /// Stop treating a root as part of the tree. Returns whether it was anchored.
    pub fn unanchor(&mut self, id: NodeId) -> TreeResult<bool> {
        let node = self.try_node_mut(id)?;
        Ok(std::mem::replace(&mut node.anchored, false))
    }

    /// Anchored roots, in slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(move |&id| self.is_anchored(id))
    }

    /// Every live node, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let tree = self.id;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.node.is_some())
            .map(move |(index, slot)| NodeId {
                tree,
                index: index as u32,
                generation: slot.generation,
            })
    }

    pub(crate) fn check(&self, id: NodeId) -> TreeResult<()> {
        self.try_node(id).map(|_| ())
    }

    pub(crate) fn try_node(&self, id: NodeId) -> TreeResult<&NodeData<T>> {
        if id.tree != self.id {
            return Err(TreeError::ForeignNode(id));
        }
        self.node(id).ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn try_node_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeData<T>> {
        if id.tree != self.id {
            return Err(TreeError::ForeignNode(id));
        }
        self.node_mut(id).ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&NodeData<T>> {
        if id.tree != self.id {
            return None;
        }
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData<T>> {
        if id.tree != self.id {
            return None;
        }
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Free a node's slot and hand back its data. Links to and from it are left to the caller.
    pub(crate) fn release(&mut self, id: NodeId) -> TreeResult<NodeData<T>> {
        self.check(id)?;
        let slot = &mut self.slots[id.index as usize];
        let data = slot.node.take().ok_or(TreeError::StaleNode(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Ok(data)
    }

    /// Number of slots, live or free.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = T;

    /// Panics if `id` is stale or belongs to another tree.
    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(payload) => payload,
            None => panic!("node {} is not in this tree", id),
        }
    }
}

impl<T> IndexMut<NodeId> for Tree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(payload) => payload,
            None => panic!("node {} is not in this tree", id),
        }
    }
}
