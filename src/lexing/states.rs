//! States and state table sets
//!
//! A [State] is a named, ordered list of rules. A [StateTableSet] maps state names to states and
//! is what a tokenize run is configured with. Sets are validated and compiled once, then shared
//! read-only by any number of runs.
//!
//! Compilation
//!
//!     Every pattern is searched anchored at the cursor over the whole text, not over the rest of
//!     it, so look-around assertions (`\b`, `(?m)^`) see the characters before the cursor. Rule
//!     order inside a state is kept exactly as declared: the engine picks the first rule that
//!     matches, not the longest match.
//!
//! Validation
//!
//!     Building fails with a [TableError] when the set is empty, a state name repeats, a pattern
//!     does not compile or can match empty text, a fixed push/replace target names a state that
//!     does not exist, or the declared initial state is unknown. Dynamic targets can only be
//!     checked at runtime.

use crate::error::TableError;
use crate::lexing::rules::{Action, Rule, StateTarget};
use regex::{Captures, Regex};
use regex_automata::{meta, Anchored, Input};
use std::collections::HashMap;

/// A rule with its compiled pattern and resolved fixed target.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule<K> {
    /// Searched anchored at the cursor.
    matcher: meta::Regex,
    /// Same pattern, used to extract captures for dynamic targets.
    regex: Regex,
    pub(crate) rule: Rule<K>,
    /// Index of the fixed push/replace target, if the rule has one.
    pub(crate) target: Option<usize>,
}

impl<K> CompiledRule<K> {
    /// Length of the match starting exactly at `start`; zero-width matches count as none.
    pub(crate) fn match_len(&self, text: &str, start: usize) -> Option<usize> {
        let input = Input::new(text).range(start..).anchored(Anchored::Yes);
        self.matcher
            .search(&input)
            .map(|m| m.len())
            .filter(|&len| len > 0)
    }

    /// Captures of the match at `start`. Only meaningful once [match_len](Self::match_len) found
    /// one there: the leftmost match from `start` is then the one starting at `start`.
    pub(crate) fn captures_at<'t>(&self, text: &'t str, start: usize) -> Option<Captures<'t>> {
        self.regex
            .captures_at(text, start)
            .filter(|captures| captures.get(0).is_some_and(|m| m.start() == start))
    }
}

/// A named lexer state: an ordered list of rules.
#[derive(Debug, Clone)]
pub struct State<K> {
    name: String,
    fallthrough: bool,
    pub(crate) rules: Vec<CompiledRule<K>>,
}

impl<K> State<K> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the state is left, without consuming input, when none of its rules match.
    pub fn is_fallthrough(&self) -> bool {
        self.fallthrough
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule<K>> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// An immutable, validated set of lexer states.
#[derive(Debug, Clone)]
pub struct StateTableSet<K> {
    states: Vec<State<K>>,
    index: HashMap<String, usize>,
    initial: Option<usize>,
}

impl<K> StateTableSet<K> {
    pub fn builder() -> StateTableBuilder<K> {
        StateTableBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&State<K>> {
        self.index.get(name).map(|&id| &self.states[id])
    }

    /// The declared initial state, if the set names one.
    pub fn initial(&self) -> Option<&str> {
        self.initial.map(|id| self.states[id].name())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// State names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(State::name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn id_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn state(&self, id: usize) -> &State<K> {
        &self.states[id]
    }
}

/// Declaration of one state, before compilation.
#[derive(Debug, Clone)]
struct StateSpec<K> {
    name: String,
    fallthrough: bool,
    rules: Vec<Rule<K>>,
}

/// Collects state declarations and compiles them into a [StateTableSet].
#[derive(Debug, Clone)]
pub struct StateTableBuilder<K> {
    specs: Vec<StateSpec<K>>,
    initial: Option<String>,
}

impl<K> Default for StateTableBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> StateTableBuilder<K> {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            initial: None,
        }
    }

    /// Name the state runs usually start in. Checked against the declared states on build.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Declare a state with its rules in precedence order.
    pub fn state(self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule<K>>) -> Self {
        self.declare(name.into(), false, rules.into_iter().collect())
    }

    /// Declare a state that is popped when none of its rules match.
    pub fn fallthrough_state(
        self,
        name: impl Into<String>,
        rules: impl IntoIterator<Item = Rule<K>>,
    ) -> Self {
        self.declare(name.into(), true, rules.into_iter().collect())
    }

    fn declare(mut self, name: String, fallthrough: bool, rules: Vec<Rule<K>>) -> Self {
        self.specs.push(StateSpec {
            name,
            fallthrough,
            rules,
        });
        self
    }

    pub fn build(self) -> Result<StateTableSet<K>, TableError> {
        if self.specs.is_empty() {
            return Err(TableError::Empty);
        }

        let mut index = HashMap::with_capacity(self.specs.len());
        for (id, spec) in self.specs.iter().enumerate() {
            if index.insert(spec.name.clone(), id).is_some() {
                return Err(TableError::DuplicateState(spec.name.clone()));
            }
        }

        let initial = match self.initial {
            Some(name) => match index.get(&name) {
                Some(&id) => Some(id),
                None => return Err(TableError::UnknownInitial(name)),
            },
            None => None,
        };

        let mut states = Vec::with_capacity(self.specs.len());
        for spec in self.specs {
            let mut rules = Vec::with_capacity(spec.rules.len());
            for rule in spec.rules {
                rules.push(compile_rule(&spec.name, rule, &index)?);
            }
            states.push(State {
                name: spec.name,
                fallthrough: spec.fallthrough,
                rules,
            });
        }

        Ok(StateTableSet {
            states,
            index,
            initial,
        })
    }
}

fn compile_rule<K>(
    state: &str,
    rule: Rule<K>,
    index: &HashMap<String, usize>,
) -> Result<CompiledRule<K>, TableError> {
    let invalid = |source: Box<dyn std::error::Error + Send + Sync>| TableError::InvalidPattern {
        state: state.to_string(),
        pattern: rule.pattern.clone(),
        source,
    };
    let regex = Regex::new(&rule.pattern).map_err(|err| invalid(Box::new(err)))?;
    let matcher = meta::Regex::new(&rule.pattern).map_err(|err| invalid(Box::new(err)))?;
    if matcher.is_match(Input::new("").anchored(Anchored::Yes)) {
        return Err(TableError::EmptyMatch {
            state: state.to_string(),
            pattern: rule.pattern.clone(),
        });
    }

    let target = match &rule.action {
        Action::Push(StateTarget::Fixed(name)) | Action::Replace(StateTarget::Fixed(name)) => {
            let id = index.get(name).ok_or_else(|| TableError::UnknownTarget {
                state: state.to_string(),
                target: name.clone(),
            })?;
            Some(*id)
        }
        _ => None,
    };

    Ok(CompiledRule {
        matcher,
        regex,
        rule,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_resolves_targets() {
        let tables = StateTableSet::builder()
            .state("default", [Rule::new(r"\{", "lbrace").push("block")])
            .state("block", [Rule::new(r"\}", "rbrace").pop()])
            .build()
            .unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables.names().collect::<Vec<_>>(), vec!["default", "block"]);
        let default = tables.get("default").unwrap();
        assert_eq!(default.rules[0].target, Some(1));
        assert_eq!(tables.get("block").unwrap().rules[0].target, None);
    }

    #[test]
    fn test_patterns_are_anchored() {
        let tables = StateTableSet::builder()
            .state("default", [Rule::new("b", "b")])
            .build()
            .unwrap();
        let rule = &tables.get("default").unwrap().rules[0];
        assert_eq!(rule.match_len("ab", 0), None);
        assert_eq!(rule.match_len("ab", 1), Some(1));
        assert_eq!(rule.match_len("ba", 0), Some(1));
    }

    #[test]
    fn test_patterns_see_text_before_the_cursor() {
        let tables = StateTableSet::builder()
            .state(
                "default",
                [Rule::new(r"\bx", "word_start"), Rule::new(r"(?m)^#", "line_start")],
            )
            .build()
            .unwrap();
        let rules = &tables.get("default").unwrap().rules;
        assert_eq!(rules[0].match_len("ax", 1), None);
        assert_eq!(rules[0].match_len("a x", 2), Some(1));
        assert_eq!(rules[1].match_len("a#", 1), None);
        assert_eq!(rules[1].match_len("a\n#", 2), Some(1));
    }

    #[test]
    fn test_initial_state() {
        let tables = StateTableSet::builder()
            .state("a", [Rule::new("x", "x")])
            .state("b", [Rule::new("y", "y")])
            .initial("b")
            .build()
            .unwrap();
        assert_eq!(tables.initial(), Some("b"));

        let tables = StateTableSet::builder()
            .state("a", [Rule::new("x", "x")])
            .build()
            .unwrap();
        assert_eq!(tables.initial(), None);

        let err = StateTableSet::builder()
            .state("a", [Rule::new("x", "x")])
            .initial("nowhere")
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownInitial(name) if name == "nowhere"));
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = StateTableBuilder::<&str>::new().build().unwrap_err();
        assert!(matches!(err, TableError::Empty));
    }

    #[test]
    fn test_duplicate_state_is_rejected() {
        let err = StateTableSet::builder()
            .state("a", [Rule::new("x", "x")])
            .state("a", [Rule::new("y", "y")])
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::DuplicateState(name) if name == "a"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = StateTableSet::builder()
            .state("default", [Rule::new("(unclosed", "x")])
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_empty_matching_pattern_is_rejected() {
        let err = StateTableSet::builder()
            .state("default", [Rule::new("a*", "a")])
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::EmptyMatch { .. }));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let err = StateTableSet::builder()
            .state("default", [Rule::new(r"\{", "lbrace").push("nowhere")])
            .build()
            .unwrap_err();
        assert!(
            matches!(err, TableError::UnknownTarget { ref state, ref target } if state == "default" && target == "nowhere")
        );
    }

    #[test]
    fn test_dynamic_targets_are_not_checked_at_build() {
        let tables = StateTableSet::builder()
            .state("default", [Rule::new(r"(\w)", "w").push_dynamic("s_$1")])
            .build();
        assert!(tables.is_ok());
    }
}
