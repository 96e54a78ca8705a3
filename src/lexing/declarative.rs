//! Declarative state tables
//!
//! State tables are data, so they can be written down instead of built in code. A
//! [TableDefinition] deserializes from YAML or JSON and builds into the same validated
//! [StateTableSet] the builder produces:
//!
//!     initial: default
//!     states:
//!       - name: default
//!         rules:
//!           - { pattern: '\s+', kind: space, skip: true }
//!           - { pattern: '[a-z]+', kind: ident }
//!           - { pattern: '\{', kind: lbrace, push: block }
//!       - name: block
//!         rules:
//!           - { pattern: '[a-z]+', kind: ident }
//!           - { pattern: '\}', kind: rbrace, pop: true }
//!
//! Rule order in the file is rule precedence. Each rule carries at most one of `push`,
//! `push_dynamic`, `replace`, `replace_dynamic` and `pop`.

use crate::error::TableError;
use crate::lexing::rules::Rule;
use crate::lexing::states::{StateTableBuilder, StateTableSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A whole table set as written in a definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition<K> {
    /// Suggested initial state for callers that do not pick one themselves. Must name a
    /// declared state; kept on the built set as [StateTableSet::initial].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    pub states: Vec<StateDefinition<K>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDefinition<K> {
    pub name: String,
    #[serde(default)]
    pub fallthrough: bool,
    pub rules: Vec<RuleDefinition<K>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition<K> {
    pub pattern: String,
    pub kind: K,
    #[serde(default)]
    pub skip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_dynamic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_dynamic: Option<String>,
    #[serde(default)]
    pub pop: bool,
}

impl<K> RuleDefinition<K> {
    fn into_rule(self, state: &str) -> Result<Rule<K>, TableError> {
        let transitions = [
            self.push.is_some(),
            self.push_dynamic.is_some(),
            self.replace.is_some(),
            self.replace_dynamic.is_some(),
            self.pop,
        ];
        if transitions.iter().filter(|&&set| set).count() > 1 {
            return Err(TableError::ConflictingActions {
                state: state.to_string(),
                pattern: self.pattern,
            });
        }

        let mut rule = Rule::new(self.pattern, self.kind);
        if self.skip {
            rule = rule.skip();
        }
        rule = if let Some(target) = self.push {
            rule.push(target)
        } else if let Some(template) = self.push_dynamic {
            rule.push_dynamic(template)
        } else if let Some(target) = self.replace {
            rule.replace(target)
        } else if let Some(template) = self.replace_dynamic {
            rule.replace_dynamic(template)
        } else if self.pop {
            rule.pop()
        } else {
            rule
        };
        Ok(rule)
    }
}

impl<K> TableDefinition<K> {
    /// Validate and compile the definition.
    pub fn build(self) -> Result<StateTableSet<K>, TableError> {
        let mut builder = StateTableBuilder::new();
        for state in self.states {
            let rules = state
                .rules
                .into_iter()
                .map(|rule| rule.into_rule(&state.name))
                .collect::<Result<Vec<_>, _>>()?;
            builder = if state.fallthrough {
                builder.fallthrough_state(state.name, rules)
            } else {
                builder.state(state.name, rules)
            };
        }
        if let Some(initial) = self.initial {
            builder = builder.initial(initial);
        }
        builder.build()
    }
}

impl<K: DeserializeOwned> TableDefinition<K> {
    pub fn from_yaml_str(source: &str) -> Result<Self, TableError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Parse and build a YAML table definition in one step.
pub fn load_yaml<K: DeserializeOwned>(source: &str) -> Result<StateTableSet<K>, TableError> {
    TableDefinition::from_yaml_str(source)?.build()
}

/// Parse and build a JSON table definition in one step.
pub fn load_json<K: DeserializeOwned>(source: &str) -> Result<StateTableSet<K>, TableError> {
    TableDefinition::from_json_str(source)?.build()
}
