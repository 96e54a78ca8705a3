//! # ly-core
//!
//! Building blocks for parsers of structured markup: a stateful lexer driven by data tables, and
//! a node tree to hold and edit what a parser builds from its tokens.
//!
//! Layout
//!
//!     src/
//!       ├── lexing    Token stream over a state table set (see [lexing])
//!       ├── tree      Arena node tree with weak references (see [tree])
//!       ├── config    Lexer policies and their loader
//!       ├── error     Error types for each phase
//!       └── testing   Fixtures shared by unit and integration tests
//!
//! The two halves do not know about each other: the lexer never builds nodes and the tree never
//! matches patterns. A downstream parser pulls tokens and assembles the tree.
//!
//! Logging goes through `tracing`; the library emits events but never installs a subscriber.

pub mod config;
pub mod error;
pub mod lexing;
pub mod testing;
pub mod tree;

pub use config::{LexerConfig, NoMatchPolicy, UnderflowPolicy};
pub use error::{LexError, TableError, TreeError, TreeResult};
pub use lexing::{resume, tokenize, tokenize_with, Lexer, Rule, StateTableSet, Token, TokenKind};
pub use tree::{NodeId, Traversal, Tree, WeakNode};
