//! Node tree
//!
//!     Parsed results are held in a [Tree]: an arena of nodes, each with an opaque payload, an
//!     ordered list of children and a link to its parent. Callers hold [NodeId]s and pass them
//!     back to the tree, so every mutation goes through `&mut Tree` and the borrow checker keeps
//!     readers and writers apart.
//!
//! Ownership
//!
//!     A node has at most one parent, and the parent owns the position of the node in its child
//!     list. Attaching a node first detaches it from wherever it was, and attaching a node under
//!     itself or one of its descendants is refused. Detached nodes stay valid until they are
//!     [removed](Tree::remove) or [pruned](Tree::prune), so a subtree can be moved around freely.
//!
//!     Roots created with [Tree::new_root] are anchored: everything reachable from an anchored
//!     root is "in the tree". [WeakNode] references resolve only to such nodes.
//!
//! Modules
//!
//!     arena      storage, ids and payload access
//!     mutation   attach, detach, replace, remove, copy
//!     traversal  navigation, iteration orders, find
//!     weak       non-owning references
//!     snapshot   serializable copies and treeviz dumps

pub mod arena;
pub mod mutation;
pub mod snapshot;
pub mod traversal;
pub mod weak;

pub use arena::{NodeId, Tree};
pub use snapshot::TreeSnapshot;
pub use traversal::{Ancestors, Children, Traversal, Traverse};
pub use weak::WeakNode;
