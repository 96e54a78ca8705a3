//! Testing utilities
//!
//! Shared fixtures for unit and integration tests: a small token kind enum, the brace-block
//! state tables (built in code and as YAML) and factories for expected token streams.
//!
//! Tests should assert on whole token streams built with [mk_tokens] (or [mk_tokens_in] for
//! non-ASCII sources) rather than on counts, so that a failure shows exactly which token changed:
//!
//!     assert_eq!(
//!         tokenize("a {b}", &brace_tables(), "default")?.collect::<Vec<_>>(),
//!         mk_tokens(&[
//!             (TokenKind::Rule(Kind::Ident), "a", 0),
//!             (TokenKind::Rule(Kind::LBrace), "{", 2),
//!             ...
//!         ])
//!     );

use crate::lexing::{Rule, StateTableSet, Token, TokenKind};
use crate::tree::{NodeId, Tree};
use serde::{Deserialize, Serialize};

/// Token kinds used by the fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Ident,
    Word,
    Space,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Command,
    Quote,
}

/// Brace blocks: identifiers separated by whitespace, `{` enters a nested `block`, `}` leaves it.
pub const BRACE_TABLES_YAML: &str = r#"
initial: default
states:
  - name: default
    rules:
      - { pattern: '\s+', kind: space, skip: true }
      - { pattern: '[A-Za-z_][A-Za-z0-9_]*', kind: ident }
      - { pattern: '\{', kind: l_brace, push: block }
      - { pattern: '\}', kind: r_brace, pop: true }
  - name: block
    rules:
      - { pattern: '\s+', kind: space, skip: true }
      - { pattern: '[A-Za-z_][A-Za-z0-9_]*', kind: ident }
      - { pattern: '\{', kind: l_brace, push: block }
      - { pattern: '\}', kind: r_brace, pop: true }
"#;

fn brace_rules() -> [Rule<Kind>; 4] {
    [
        Rule::new(r"\s+", Kind::Space).skip(),
        Rule::new(r"[A-Za-z_][A-Za-z0-9_]*", Kind::Ident),
        Rule::new(r"\{", Kind::LBrace).push("block"),
        Rule::new(r"\}", Kind::RBrace).pop(),
    ]
}

/// The brace-block tables built in code; equivalent to [BRACE_TABLES_YAML].
pub fn brace_tables() -> StateTableSet<Kind> {
    StateTableSet::builder()
        .state("default", brace_rules())
        .state("block", brace_rules())
        .initial("default")
        .build()
        .expect("brace tables are valid")
}

/// Build an expected token stream from (kind, text, byte offset) triples over ASCII text, where
/// character positions equal byte offsets.
pub fn mk_tokens<'t, K: Clone>(items: &[(TokenKind<K>, &'t str, usize)]) -> Vec<Token<'t, K>> {
    items
        .iter()
        .map(|(kind, text, offset)| Token::new(kind.clone(), text, *offset, *offset))
        .collect()
}

/// Like [mk_tokens], deriving each character position from `source`.
pub fn mk_tokens_in<'t, K: Clone>(
    source: &str,
    items: &[(TokenKind<K>, &'t str, usize)],
) -> Vec<Token<'t, K>> {
    items
        .iter()
        .map(|(kind, text, offset)| {
            let char_offset = source[..*offset].chars().count();
            Token::new(kind.clone(), text, *offset, char_offset)
        })
        .collect()
}

/// Build a tree from a nested description, returning the anchored root.
///
/// `("root", [("a", []), ("b", [("c", [])])])` style descriptions are written with [Shape].
pub fn mk_tree(shape: &Shape) -> (Tree<String>, NodeId) {
    let mut tree = Tree::new();
    let root = tree.new_root(shape.label.to_string());
    attach_shape(&mut tree, root, &shape.children);
    (tree, root)
}

fn attach_shape(tree: &mut Tree<String>, parent: NodeId, children: &[Shape]) {
    for shape in children {
        let child = tree.new_node(shape.label.to_string());
        tree.append(parent, child).expect("fresh nodes attach");
        attach_shape(tree, child, &shape.children);
    }
}

/// A nested tree description for [mk_tree].
#[derive(Debug, Clone)]
pub struct Shape {
    pub label: &'static str,
    pub children: Vec<Shape>,
}

/// Leaf shape.
pub fn leaf(label: &'static str) -> Shape {
    Shape {
        label,
        children: Vec::new(),
    }
}

/// Inner shape.
pub fn branch(label: &'static str, children: impl IntoIterator<Item = Shape>) -> Shape {
    Shape {
        label,
        children: children.into_iter().collect(),
    }
}

/// Payload labels of the children of `node`, in order.
pub fn child_labels(tree: &Tree<String>, node: NodeId) -> Vec<&str> {
    tree.children(node).map(|id| tree[id].as_str()).collect()
}
