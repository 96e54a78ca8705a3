//! Error types
//!
//! Errors are split by the phase in which they can happen:
//!
//!     - [TableError] is raised while building a state table set. These are configuration
//!       mistakes and are reported before any text is tokenized.
//!     - [LexError] is raised when starting (or resuming) a tokenize run with arguments that do
//!       not fit the table set. Once a run has started, the lexer never fails: unmatched text
//!       and unbalanced pops degrade to fallback tokens.
//!     - [TreeError] is raised by structural tree mutations that would break the
//!       single-parent / acyclic invariants, or that name a node the tree no longer holds.

use crate::tree::NodeId;
use thiserror::Error;

/// Errors found while constructing or loading a state table set.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("state table set has no states")]
    Empty,

    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),

    #[error("state `{state}`: invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        state: String,
        pattern: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("state `{state}`: pattern `{pattern}` can match empty text")]
    EmptyMatch { state: String, pattern: String },

    #[error("state `{state}`: rule targets unknown state `{target}`")]
    UnknownTarget { state: String, target: String },

    #[error("initial state `{0}` is not declared")]
    UnknownInitial(String),

    #[error("state `{state}`: rule `{pattern}` declares more than one transition")]
    ConflictingActions { state: String, pattern: String },

    #[error("invalid YAML table definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON table definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when starting a tokenize run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown state `{0}`")]
    UnknownState(String),

    #[error("checkpoint has an empty state stack")]
    EmptyCheckpoint,

    #[error("checkpoint offset {offset} is not a character boundary of a {len}-byte text")]
    InvalidOffset { offset: usize, len: usize },
}

/// Errors raised by tree mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} has been removed from the tree")]
    StaleNode(NodeId),

    #[error("node {0} belongs to a different tree")]
    ForeignNode(NodeId),

    #[error("attaching {child} under {parent} would make a node its own ancestor")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("index {index} is out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("node {0} has no parent")]
    NoParent(NodeId),

    #[error("node {0} is attached to a parent; only roots can be anchored")]
    Attached(NodeId),
}

pub type TreeResult<T> = std::result::Result<T, TreeError>;
