//! Token definitions
//!
//! A token is a classified span of the input. The classification is the caller's kind type `K`
//! for text matched by a rule, or one of the engine's own fallback kinds.
//!
//! Every token carries two positions of its first character. `char_offset` counts characters
//! from the start of the text. `offset` is the byte offset into the tokenized `&str`; it always
//! falls on a character boundary, so `&source[token.span()] == token.text` holds for every token.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind<K> {
    /// Text matched by a rule carrying this kind.
    Rule(K),
    /// A single character no rule of the current state matched.
    Unparsed,
    /// Text matched by a popping rule while the context stack had a single state.
    /// Only produced under [UnderflowPolicy::Flag](crate::config::UnderflowPolicy::Flag).
    Unbalanced(K),
}

impl<K> TokenKind<K> {
    /// The rule kind, for both matched and unbalanced tokens.
    pub fn rule_kind(&self) -> Option<&K> {
        match self {
            TokenKind::Rule(kind) | TokenKind::Unbalanced(kind) => Some(kind),
            TokenKind::Unparsed => None,
        }
    }
}

/// A classified, positioned span of input text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token<'t, K> {
    pub kind: TokenKind<K>,
    pub text: &'t str,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Character position of the first character.
    pub char_offset: usize,
}

impl<'t, K> Token<'t, K> {
    pub fn new(kind: TokenKind<K>, text: &'t str, offset: usize, char_offset: usize) -> Self {
        Self {
            kind,
            text,
            offset,
            char_offset,
        }
    }

    /// Byte offset one past the last byte of the token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Byte range of the token in the source.
    pub fn span(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Character position one past the last character of the token.
    pub fn char_end(&self) -> usize {
        self.char_offset + self.text.chars().count()
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self.kind, TokenKind::Unparsed)
    }

    pub fn is_unbalanced(&self) -> bool {
        matches!(self.kind, TokenKind::Unbalanced(_))
    }

    pub fn rule_kind(&self) -> Option<&K> {
        self.kind.rule_kind()
    }
}

impl<K: fmt::Debug> fmt::Display for Token<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Rule(kind) => write!(f, "{:?}({:?})@{}", kind, self.text, self.offset),
            TokenKind::Unparsed => write!(f, "Unparsed({:?})@{}", self.text, self.offset),
            TokenKind::Unbalanced(kind) => {
                write!(f, "Unbalanced {:?}({:?})@{}", kind, self.text, self.offset)
            }
        }
    }
}
