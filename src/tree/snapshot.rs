//! Tree snapshots and treeviz dumps
//!
//! A [TreeSnapshot] is a plain, owned copy of a subtree with every payload rendered through
//! `Display`. It is what serializers and tests consume, so none of them walk the arena
//! themselves.
//!
//! Treeviz
//!
//!     One line per node, the root first and unindented. Each nesting level adds two columns of
//!     prefix, and every child line carries a connector:
//!
//!         r
//!         ├─ a
//!         │ └─ c
//!         └─ b
//!
//!     Line breaks inside a label are shown as `↵` so each node stays on one line.

use crate::tree::arena::{NodeId, Tree};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|[\r\n]").expect("line break pattern is valid"));

/// An owned, serializable copy of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSnapshot>,
}

impl TreeSnapshot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: TreeSnapshot) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in the snapshot, itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeSnapshot::size).sum::<usize>()
    }

    /// Render as treeviz text, without a trailing newline.
    pub fn to_treeviz(&self) -> String {
        let mut lines = vec![one_line(&self.label)];
        let count = self.children.len();
        for (index, child) in self.children.iter().enumerate() {
            child.write_treeviz(&mut lines, "", index + 1 == count);
        }
        lines.join("\n")
    }

    fn write_treeviz(&self, lines: &mut Vec<String>, prefix: &str, is_last: bool) {
        let connector = if is_last { "└─" } else { "├─" };
        lines.push(format!("{}{} {}", prefix, connector, one_line(&self.label)));

        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        let count = self.children.len();
        for (index, child) in self.children.iter().enumerate() {
            child.write_treeviz(lines, &child_prefix, index + 1 == count);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn one_line(label: &str) -> String {
    LINE_BREAK.replace_all(label, "↵").into_owned()
}

impl<T: Display> Tree<T> {
    /// Snapshot the subtree rooted at `id`; `None` for a stale id.
    pub fn snapshot(&self, id: NodeId) -> Option<TreeSnapshot> {
        let payload = self.get(id)?;
        let mut snapshot = TreeSnapshot::new(payload.to_string());
        snapshot.children = self
            .children(id)
            .filter_map(|child| self.snapshot(child))
            .collect();
        Some(snapshot)
    }

    /// Treeviz text of the subtree rooted at `id`.
    pub fn dump(&self, id: NodeId) -> Option<String> {
        self.snapshot(id).map(|snapshot| snapshot.to_treeviz())
    }
}
