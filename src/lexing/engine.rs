//! State lexer engine
//!
//!     The engine interprets a [StateTableSet]: it keeps a context stack of active states and a
//!     cursor into the text, and on every pull it runs the rules of the state on top of the stack
//!     until one token is produced.
//!
//! One Step
//!
//!     1. Scan the rules of the current state in declared order. The first rule whose pattern
//!        matches at the cursor wins. Zero-width matches count as no match.
//!     2. If nothing matched and the state is a fallthrough state with an enclosing state, pop it
//!        and retry at the same cursor. Otherwise apply the no-match policy: the character at the
//!        cursor becomes an `Unparsed` token or is skipped. Either way the cursor moves by one
//!        character.
//!     3. On a match, advance past it, apply the rule's transition and emit the token unless the
//!        rule is a skip rule.
//!
//!     The cursor strictly advances on every step that does not pop a fallthrough state, and
//!     fallthrough pops shrink the stack, so every run terminates.
//!
//! Residual State
//!
//!     Reaching the end of the text with nested states still open is not an error. The stack stays
//!     observable through [Lexer::stack], and [Lexer::checkpoint] captures it together with the
//!     cursor so a later run can [resume](Lexer::resume) from the same point.

use crate::config::{LexerConfig, NoMatchPolicy, UnderflowPolicy};
use crate::error::LexError;
use crate::lexing::rules::{Action, StateTarget};
use crate::lexing::states::{CompiledRule, StateTableSet};
use crate::lexing::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use tracing::{debug, trace, warn};

/// Stack of active states. The current state lives outside the vector, so the stack can never
/// be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContextStack {
    enclosing: Vec<usize>,
    current: usize,
}

impl ContextStack {
    fn new(initial: usize) -> Self {
        Self {
            enclosing: Vec::new(),
            current: initial,
        }
    }

    fn push(&mut self, state: usize) {
        self.enclosing.push(self.current);
        self.current = state;
    }

    /// Returns false, leaving the stack unchanged, when only one state is active.
    fn pop(&mut self) -> bool {
        match self.enclosing.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    fn replace(&mut self, state: usize) {
        self.current = state;
    }

    fn depth(&self) -> usize {
        self.enclosing.len() + 1
    }

    /// State ids from the bottom of the stack to the top.
    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.enclosing
            .iter()
            .copied()
            .chain(std::iter::once(self.current))
    }
}

/// A saved lexer position: the cursor and the names of the active states, bottom first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    pub offset: usize,
    pub stack: Vec<String>,
}

impl Checkpoint {
    pub fn new(offset: usize, stack: Vec<String>) -> Self {
        Self { offset, stack }
    }

    /// The start of a fresh run in `initial`.
    pub fn at_start(initial: impl Into<String>) -> Self {
        Self {
            offset: 0,
            stack: vec![initial.into()],
        }
    }
}

/// The outcome of matching the current state's rules at the cursor.
struct RuleMatch<'s, K> {
    rule: &'s CompiledRule<K>,
    len: usize,
    /// Name chosen by a dynamic target.
    selected: Option<String>,
}

/// A single tokenize run: a lazy, forward-only iterator of tokens.
#[derive(Debug, Clone)]
pub struct Lexer<'t, 's, K> {
    text: &'t str,
    tables: &'s StateTableSet<K>,
    config: LexerConfig,
    stack: ContextStack,
    cursor: usize,
    /// Characters before the cursor.
    char_cursor: usize,
}

impl<'t, 's, K> Lexer<'t, 's, K> {
    /// Start a run at the beginning of `text` in state `initial`.
    pub fn new(
        text: &'t str,
        tables: &'s StateTableSet<K>,
        initial: &str,
        config: LexerConfig,
    ) -> Result<Self, LexError> {
        let initial = tables
            .id_of(initial)
            .ok_or_else(|| LexError::UnknownState(initial.to_string()))?;
        Ok(Self {
            text,
            tables,
            config,
            stack: ContextStack::new(initial),
            cursor: 0,
            char_cursor: 0,
        })
    }

    /// Continue a run from a checkpoint taken on the same (or an equal prefix of the) text.
    pub fn resume(
        text: &'t str,
        tables: &'s StateTableSet<K>,
        checkpoint: &Checkpoint,
        config: LexerConfig,
    ) -> Result<Self, LexError> {
        if checkpoint.offset > text.len() || !text.is_char_boundary(checkpoint.offset) {
            return Err(LexError::InvalidOffset {
                offset: checkpoint.offset,
                len: text.len(),
            });
        }

        let mut ids = Vec::with_capacity(checkpoint.stack.len());
        for name in &checkpoint.stack {
            let id = tables
                .id_of(name)
                .ok_or_else(|| LexError::UnknownState(name.clone()))?;
            ids.push(id);
        }
        let current = ids.pop().ok_or(LexError::EmptyCheckpoint)?;

        Ok(Self {
            text,
            tables,
            config,
            stack: ContextStack {
                enclosing: ids,
                current,
            },
            cursor: checkpoint.offset,
            char_cursor: text[..checkpoint.offset].chars().count(),
        })
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Character position of the cursor.
    pub fn char_position(&self) -> usize {
        self.char_cursor
    }

    /// The text not yet consumed.
    pub fn remaining(&self) -> &'t str {
        &self.text[self.cursor..]
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Name of the state on top of the stack.
    pub fn state(&self) -> &'s str {
        self.tables.state(self.stack.current).name()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Names of the active states, bottom first.
    pub fn stack(&self) -> Vec<&'s str> {
        let tables = self.tables;
        self.stack.iter().map(|id| tables.state(id).name()).collect()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.cursor,
            stack: self.stack().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn config(&self) -> LexerConfig {
        self.config
    }

    fn match_rules(&self, start: usize) -> Option<RuleMatch<'s, K>> {
        let tables = self.tables;
        let state = tables.state(self.stack.current);
        for rule in &state.rules {
            let Some(len) = rule.match_len(self.text, start) else {
                continue;
            };
            let selected = match rule.rule.action.target() {
                Some(StateTarget::Dynamic(selector)) => rule
                    .captures_at(self.text, start)
                    .and_then(|captures| selector.select(&captures)),
                _ => None,
            };
            return Some(RuleMatch {
                rule,
                len,
                selected,
            });
        }
        None
    }

    /// The state id a push or replace enters, if it names a known state.
    fn resolve_target(&self, found: &RuleMatch<'s, K>) -> Option<usize> {
        if let Some(id) = found.rule.target {
            return Some(id);
        }
        let name = found.selected.as_deref();
        match name.and_then(|name| self.tables.id_of(name)) {
            Some(id) => Some(id),
            None => {
                warn!(
                    state = self.state(),
                    offset = self.cursor,
                    target = name.unwrap_or(""),
                    "dynamic transition selected an unknown state; staying put"
                );
                None
            }
        }
    }
}

impl<'t, 's, K: Clone> Iterator for Lexer<'t, 's, K> {
    type Item = Token<'t, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        loop {
            if self.cursor >= text.len() {
                return None;
            }
            let start = self.cursor;
            let char_start = self.char_cursor;
            let rest = &text[start..];

            let Some(found) = self.match_rules(start) else {
                let tables = self.tables;
                if tables.state(self.stack.current).is_fallthrough() && self.stack.pop() {
                    debug!(offset = start, state = self.state(), "fell through to enclosing state");
                    continue;
                }

                let width = rest.chars().next().map_or(1, char::len_utf8);
                self.cursor += width;
                self.char_cursor += 1;
                match self.config.no_match {
                    NoMatchPolicy::Unparsed => {
                        debug!(offset = start, state = self.state(), "no rule matched");
                        return Some(Token::new(
                            TokenKind::Unparsed,
                            &rest[..width],
                            start,
                            char_start,
                        ));
                    }
                    NoMatchPolicy::Skip => continue,
                }
            };

            let matched = &rest[..found.len];
            self.cursor += found.len;
            self.char_cursor += matched.chars().count();
            let rule = &found.rule.rule;
            let mut kind = TokenKind::Rule(rule.kind.clone());
            let mut emit = !rule.skip;

            match &rule.action {
                Action::Stay => {}
                Action::Push(_) => {
                    if let Some(id) = self.resolve_target(&found) {
                        self.stack.push(id);
                        trace!(offset = start, state = self.state(), "push");
                    }
                }
                Action::Replace(_) => {
                    if let Some(id) = self.resolve_target(&found) {
                        self.stack.replace(id);
                        trace!(offset = start, state = self.state(), "replace");
                    }
                }
                Action::Pop => {
                    if self.stack.pop() {
                        trace!(offset = start, state = self.state(), "pop");
                    } else {
                        match self.config.underflow {
                            UnderflowPolicy::Ignore => {
                                debug!(offset = start, "pop on a single-state stack ignored");
                            }
                            UnderflowPolicy::Flag => {
                                warn!(offset = start, text = matched, "unbalanced pop");
                                kind = TokenKind::Unbalanced(rule.kind.clone());
                                emit = true;
                            }
                        }
                    }
                }
            }

            if emit {
                return Some(Token::new(kind, matched, start, char_start));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Every token consumes at least one byte.
        (0, Some(self.text.len() - self.cursor))
    }
}

impl<K: Clone> FusedIterator for Lexer<'_, '_, K> {}
