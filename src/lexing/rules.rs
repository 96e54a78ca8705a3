//! Lexer rules
//!
//! A rule pairs a pattern with the kind of token it produces and the transition it applies to
//! the context stack. Rules are plain data: the engine interprets them, they never run code of
//! their own except for a [StateSelector::Custom] callback choosing a dynamic state.
//!
//! Rules are built fluently:
//!
//!     Rule::new(r"\s+", Kind::Space).skip()
//!     Rule::new(r"\{", Kind::LBrace).push("block")
//!     Rule::new(r"\}", Kind::RBrace).pop()
//!     Rule::new(r#"(?P<q>["'])"#, Kind::Quote).push_dynamic("string_${q}")

use regex::Captures;
use std::fmt;
use std::sync::Arc;

/// Callback selecting a state name from the captures of a match.
pub type SelectFn = Arc<dyn Fn(&Captures<'_>) -> Option<String> + Send + Sync>;

/// How a dynamic transition picks its target state.
#[derive(Clone)]
pub enum StateSelector {
    /// Expanded with [Captures::expand]: `$name`, `${name}`, `$1`, `${1}`.
    Template(String),
    Custom(SelectFn),
}

impl StateSelector {
    /// The state name selected by a match, if any.
    pub fn select(&self, captures: &Captures<'_>) -> Option<String> {
        match self {
            StateSelector::Template(template) => {
                let mut name = String::new();
                captures.expand(template, &mut name);
                if name.is_empty() {
                    None
                } else {
                    Some(name)
                }
            }
            StateSelector::Custom(select) => select(captures),
        }
    }
}

impl fmt::Debug for StateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSelector::Template(template) => f.debug_tuple("Template").field(template).finish(),
            StateSelector::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// The state entered by a push or replace.
#[derive(Debug, Clone)]
pub enum StateTarget {
    Fixed(String),
    Dynamic(StateSelector),
}

/// The context stack transition applied after a rule matches.
#[derive(Debug, Clone, Default)]
pub enum Action {
    /// Leave the stack as it is.
    #[default]
    Stay,
    /// Enter a nested state.
    Push(StateTarget),
    /// Swap the current state for another one.
    Replace(StateTarget),
    /// Return to the enclosing state.
    Pop,
}

impl Action {
    pub fn target(&self) -> Option<&StateTarget> {
        match self {
            Action::Push(target) | Action::Replace(target) => Some(target),
            Action::Stay | Action::Pop => None,
        }
    }
}

/// A single lexer rule: pattern, token kind, emission flag and transition.
#[derive(Debug, Clone)]
pub struct Rule<K> {
    pub pattern: String,
    pub kind: K,
    /// Consume the match without emitting a token.
    pub skip: bool,
    pub action: Action,
}

impl<K> Rule<K> {
    /// An emitting rule that leaves the stack untouched.
    pub fn new(pattern: impl Into<String>, kind: K) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            skip: false,
            action: Action::Stay,
        }
    }

    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn push(mut self, state: impl Into<String>) -> Self {
        self.action = Action::Push(StateTarget::Fixed(state.into()));
        self
    }

    pub fn push_dynamic(mut self, template: impl Into<String>) -> Self {
        self.action = Action::Push(StateTarget::Dynamic(StateSelector::Template(template.into())));
        self
    }

    pub fn push_with<F>(mut self, select: F) -> Self
    where
        F: Fn(&Captures<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.action = Action::Push(StateTarget::Dynamic(StateSelector::Custom(Arc::new(select))));
        self
    }

    pub fn replace(mut self, state: impl Into<String>) -> Self {
        self.action = Action::Replace(StateTarget::Fixed(state.into()));
        self
    }

    pub fn replace_dynamic(mut self, template: impl Into<String>) -> Self {
        self.action =
            Action::Replace(StateTarget::Dynamic(StateSelector::Template(template.into())));
        self
    }

    pub fn pop(mut self) -> Self {
        self.action = Action::Pop;
        self
    }
}
