//! Lexer
//!
//!     This module turns raw text into a lazy stream of tokens under a context-sensitive grammar.
//!     The grammar is data: a [StateTableSet] of named states, each an ordered list of rules.
//!     The [Lexer] interprets it with a context stack, where the state on top decides which rules
//!     are tried next. Pushing enters a nested lexical region (a string, a block, a comment) and
//!     popping returns to the enclosing one.
//!
//! Matching
//!
//!     Rules are tried in declared order and the first match at the cursor wins. Text no rule
//!     matches is handled by the no-match policy (see [config](crate::config)), so malformed input
//!     never stops a run: it shows up as `Unparsed` tokens, `Unbalanced` tokens, or a residual
//!     stack at the end of the text.
//!
//! Building Tables
//!
//!     Tables are built with [StateTableSet::builder] and [Rule], or loaded from YAML / JSON with
//!     [declarative]. Both paths validate the tables once; a run never sees a malformed table.
//!
//!     For example, to lex brace-delimited blocks:
//!
//!         let tables = StateTableSet::builder()
//!             .state("default", [
//!                 Rule::new(r"\s+", Kind::Space).skip(),
//!                 Rule::new(r"[a-z]+", Kind::Ident),
//!                 Rule::new(r"\{", Kind::LBrace).push("block"),
//!             ])
//!             .state("block", [
//!                 Rule::new(r"[a-z]+", Kind::Ident),
//!                 Rule::new(r"\}", Kind::RBrace).pop(),
//!             ])
//!             .build()?;
//!
//!         for token in tokenize("a {b}", &tables, "default")? { ... }

pub mod declarative;
pub mod engine;
pub mod rules;
pub mod states;
pub mod token;

pub use declarative::{load_json, load_yaml, RuleDefinition, StateDefinition, TableDefinition};
pub use engine::{Checkpoint, Lexer};
pub use rules::{Action, Rule, SelectFn, StateSelector, StateTarget};
pub use states::{State, StateTableBuilder, StateTableSet};
pub use token::{Token, TokenKind};

use crate::config::LexerConfig;
use crate::error::LexError;

/// Tokenize `text` starting in state `initial`, with the default policies.
pub fn tokenize<'t, 's, K>(
    text: &'t str,
    tables: &'s StateTableSet<K>,
    initial: &str,
) -> Result<Lexer<'t, 's, K>, LexError> {
    Lexer::new(text, tables, initial, LexerConfig::default())
}

/// Tokenize `text` starting in state `initial`, with explicit policies.
pub fn tokenize_with<'t, 's, K>(
    text: &'t str,
    tables: &'s StateTableSet<K>,
    initial: &str,
    config: LexerConfig,
) -> Result<Lexer<'t, 's, K>, LexError> {
    Lexer::new(text, tables, initial, config)
}

/// Continue tokenizing `text` from a checkpoint.
pub fn resume<'t, 's, K>(
    text: &'t str,
    tables: &'s StateTableSet<K>,
    checkpoint: &Checkpoint,
    config: LexerConfig,
) -> Result<Lexer<'t, 's, K>, LexError> {
    Lexer::resume(text, tables, checkpoint, config)
}
