//! Lexer scenarios
//!
//! Whole token streams for small inputs, checked against the tables built in code and against the
//! same tables loaded from YAML and JSON.

use ly_core::config::{LexerConfig, NoMatchPolicy, UnderflowPolicy};
use ly_core::lexing::{load_json, load_yaml, tokenize, tokenize_with, Rule, StateTableSet, TokenKind};
use ly_core::testing::{brace_tables, mk_tokens, mk_tokens_in, Kind, BRACE_TABLES_YAML};
use ly_core::{LexError, TableError};
use rstest::rstest;

use Kind::*;
use TokenKind::{Rule as R, Unbalanced, Unparsed};

const BRACE_TABLES_JSON: &str = r#"{
  "initial": "default",
  "states": [
    { "name": "default", "rules": [
      { "pattern": "\\s+", "kind": "space", "skip": true },
      { "pattern": "[A-Za-z_][A-Za-z0-9_]*", "kind": "ident" },
      { "pattern": "\\{", "kind": "l_brace", "push": "block" },
      { "pattern": "\\}", "kind": "r_brace", "pop": true }
    ]},
    { "name": "block", "rules": [
      { "pattern": "\\s+", "kind": "space", "skip": true },
      { "pattern": "[A-Za-z_][A-Za-z0-9_]*", "kind": "ident" },
      { "pattern": "\\{", "kind": "l_brace", "push": "block" },
      { "pattern": "\\}", "kind": "r_brace", "pop": true }
    ]}
  ]
}"#;

fn tables(source: &str) -> StateTableSet<Kind> {
    match source {
        "code" => brace_tables(),
        "yaml" => load_yaml(BRACE_TABLES_YAML).unwrap(),
        "json" => load_json(BRACE_TABLES_JSON).unwrap(),
        other => panic!("unknown table source {other}"),
    }
}

#[rstest]
#[case::code("code")]
#[case::yaml("yaml")]
#[case::json("json")]
fn test_brace_block(#[case] source: &str) {
    let tables = tables(source);
    let mut lexer = tokenize("a {b}", &tables, "default").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[
            (R(Ident), "a", 0),
            (R(LBrace), "{", 2),
            (R(Ident), "b", 3),
            (R(RBrace), "}", 4),
        ])
    );
    assert_eq!(lexer.stack(), vec!["default"]);
}

#[rstest]
#[case::empty("", vec![], vec!["default"])]
#[case::only_space("  \n ", vec![], vec!["default"])]
#[case::nested("{{x}}", vec![
    (R(LBrace), "{", 0),
    (R(LBrace), "{", 1),
    (R(Ident), "x", 2),
    (R(RBrace), "}", 3),
    (R(RBrace), "}", 4),
], vec!["default"])]
#[case::unclosed("{ a { b", vec![
    (R(LBrace), "{", 0),
    (R(Ident), "a", 2),
    (R(LBrace), "{", 4),
    (R(Ident), "b", 6),
], vec!["default", "block", "block"])]
#[case::noise("a?b", vec![
    (R(Ident), "a", 0),
    (Unparsed, "?", 1),
    (R(Ident), "b", 2),
], vec!["default"])]
#[case::multibyte("é x", vec![
    (Unparsed, "é", 0),
    (R(Ident), "x", 3),
], vec!["default"])]
#[case::multibyte_block("éé {ab}", vec![
    (Unparsed, "é", 0),
    (Unparsed, "é", 2),
    (R(LBrace), "{", 5),
    (R(Ident), "ab", 6),
    (R(RBrace), "}", 8),
], vec!["default"])]
fn test_default_policies(
    #[case] input: &str,
    #[case] expected: Vec<(TokenKind<Kind>, &str, usize)>,
    #[case] stack: Vec<&str>,
) {
    let tables = brace_tables();
    let mut lexer = tokenize(input, &tables, "default").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(tokens, mk_tokens_in(input, &expected));
    assert_eq!(lexer.stack(), stack);
    assert!(lexer.is_finished());
}

#[rstest]
#[case::ignore(UnderflowPolicy::Ignore, R(RBrace))]
#[case::flag(UnderflowPolicy::Flag, Unbalanced(RBrace))]
fn test_underflow_policy(#[case] policy: UnderflowPolicy, #[case] stray: TokenKind<Kind>) {
    let tables = brace_tables();
    let config = LexerConfig::default().with_underflow(policy);
    let mut lexer = tokenize_with("a} {b}", &tables, "default", config).unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[
            (R(Ident), "a", 0),
            (stray, "}", 1),
            (R(LBrace), "{", 3),
            (R(Ident), "b", 4),
            (R(RBrace), "}", 5),
        ])
    );
    assert_eq!(lexer.depth(), 1);
}

#[rstest]
#[case::unparsed(NoMatchPolicy::Unparsed, vec![(R(Ident), "a", 0), (Unparsed, "!", 2), (Unparsed, "!", 3), (R(Ident), "b", 5)])]
#[case::skip(NoMatchPolicy::Skip, vec![(R(Ident), "a", 0), (R(Ident), "b", 5)])]
fn test_no_match_policy(
    #[case] policy: NoMatchPolicy,
    #[case] expected: Vec<(TokenKind<Kind>, &str, usize)>,
) {
    let tables = brace_tables();
    let config = LexerConfig::default().with_no_match(policy);
    let tokens: Vec<_> = tokenize_with("a !! b", &tables, "default", config)
        .unwrap()
        .collect();
    assert_eq!(tokens, mk_tokens(&expected));
}

/// Commands take numeric arguments until something else shows up.
fn command_tables() -> StateTableSet<Kind> {
    StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"\s+", Space).skip(),
                Rule::new(r"\\[a-z]+", Command).push("args"),
                Rule::new(r"[a-z]+", Word),
            ],
        )
        .fallthrough_state(
            "args",
            [Rule::new(r"\s+", Space).skip(), Rule::new(r"[0-9]+", Word)],
        )
        .build()
        .unwrap()
}

#[test]
fn test_fallthrough_arguments() {
    let tables = command_tables();
    let mut lexer = tokenize(r"\skip 1 2 bar", &tables, "default").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[
            (R(Command), r"\skip", 0),
            (R(Word), "1", 6),
            (R(Word), "2", 8),
            (R(Word), "bar", 10),
        ])
    );
    assert_eq!(lexer.stack(), vec!["default"]);
}

#[test]
fn test_dynamic_environment() {
    let input = r"\begin{verbatim}a \x\end{verbatim} z";
    let tables = StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"\s+", Space).skip(),
                Rule::new(r"\\begin\{(?P<env>[a-z]+)\}", Command).push_dynamic("$env"),
                Rule::new(r"[a-z]+", Word),
            ],
        )
        .state(
            "verbatim",
            [
                Rule::new(r"\\end\{verbatim\}", Command).pop(),
                Rule::new(r"[^\\]+|\\", Word),
            ],
        )
        .build()
        .unwrap();
    let tokens: Vec<_> = tokenize(input, &tables, "default").unwrap().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[
            (R(Command), r"\begin{verbatim}", 0),
            (R(Word), "a ", 16),
            (R(Word), r"\", 18),
            (R(Word), "x", 19),
            (R(Command), r"\end{verbatim}", 20),
            (R(Word), "z", 35),
        ])
    );
}

#[test]
fn test_unknown_dynamic_environment_stays_put() {
    let tables = StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"\\begin\{(?P<env>[a-z]+)\}", Command).push_dynamic("$env"),
                Rule::new(r"[a-z]+", Word),
            ],
        )
        .build()
        .unwrap();
    let mut lexer = tokenize(r"\begin{nothing}x", &tables, "default").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[(R(Command), r"\begin{nothing}", 0), (R(Word), "x", 15)])
    );
    assert_eq!(lexer.stack(), vec!["default"]);
}

#[test]
fn test_character_positions() {
    let tables = brace_tables();
    let tokens: Vec<_> = tokenize("éé ab", &tables, "default").unwrap().collect();
    let ab = tokens.last().unwrap();
    assert_eq!(ab.text, "ab");
    assert_eq!(ab.offset, 5);
    assert_eq!(ab.char_offset, 3);
    assert_eq!(ab.char_end(), 5);
    let positions: Vec<_> = tokens.iter().map(|t| (t.offset, t.char_offset)).collect();
    assert_eq!(positions, vec![(0, 0), (2, 1), (5, 3)]);
}

#[test]
fn test_word_boundary_sees_previous_character() {
    let tables = StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"\bx", Word),
                Rule::new(r"[a-z]", Ident),
                Rule::new(r"\s+", Space).skip(),
            ],
        )
        .build()
        .unwrap();
    let tokens: Vec<_> = tokenize("ax x", &tables, "default").unwrap().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[(R(Ident), "a", 0), (R(Ident), "x", 1), (R(Word), "x", 3)])
    );
}

#[test]
fn test_line_start_sees_previous_line() {
    let tables = StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"(?m)^#", Command),
                Rule::new(r"\n", Space).skip(),
                Rule::new(r".", Word),
            ],
        )
        .build()
        .unwrap();
    let tokens: Vec<_> = tokenize("a#\n#", &tables, "default").unwrap().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[(R(Word), "a", 0), (R(Word), "#", 1), (R(Command), "#", 3)])
    );
}

#[test]
fn test_custom_selector_push() {
    // `(` opens a group whose state depends on the character after it.
    let tables = StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"\((?P<mode>.)?", LParen).push_with(|captures| {
                    match captures.name("mode").map(|m| m.as_str()) {
                        Some("#") => Some("numbers".to_string()),
                        Some(_) => Some("words".to_string()),
                        None => None,
                    }
                }),
                Rule::new(r"[a-z]+", Word),
            ],
        )
        .state(
            "numbers",
            [Rule::new(r"[0-9]+", Word), Rule::new(r"\)", RParen).pop()],
        )
        .state(
            "words",
            [Rule::new(r"[a-z]+", Ident), Rule::new(r"\)", RParen).pop()],
        )
        .build()
        .unwrap();

    let mut lexer = tokenize("(#12)(ab)", &tables, "default").unwrap();
    assert_eq!(lexer.next().map(|t| t.text), Some("(#"));
    assert_eq!(lexer.stack(), vec!["default", "numbers"]);
    let rest: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        rest,
        mk_tokens(&[
            (R(Word), "12", 2),
            (R(RParen), ")", 4),
            (R(LParen), "(a", 5),
            (R(Ident), "b", 7),
            (R(RParen), ")", 8),
        ])
    );
    assert_eq!(lexer.stack(), vec!["default"]);

    // A selector returning nothing leaves the stack alone.
    let mut lexer = tokenize("(", &tables, "default").unwrap();
    assert_eq!(
        lexer.by_ref().collect::<Vec<_>>(),
        mk_tokens(&[(R(LParen), "(", 0)])
    );
    assert_eq!(lexer.stack(), vec!["default"]);
}

#[test]
fn test_dynamic_replace() {
    let tables = StateTableSet::builder()
        .state(
            "default",
            [
                Rule::new(r"@(?P<mode>[a-z]+):", Command).replace_dynamic("${mode}"),
                Rule::new(r".", Word),
            ],
        )
        .state(
            "digits",
            [
                Rule::new(r"[0-9]+", Word),
                Rule::new(r"@(?P<mode>[a-z]+):", Command).replace_dynamic("${mode}"),
            ],
        )
        .build()
        .unwrap();

    let mut lexer = tokenize("@digits:42@default:x", &tables, "default").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[
            (R(Command), "@digits:", 0),
            (R(Word), "42", 8),
            (R(Command), "@default:", 10),
            (R(Word), "x", 19),
        ])
    );
    assert_eq!(lexer.stack(), vec!["default"]);

    // An unknown target still emits the token and keeps the current state.
    let mut lexer = tokenize("@nowhere:x", &tables, "default").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[(R(Command), "@nowhere:", 0), (R(Word), "x", 9)])
    );
    assert_eq!(lexer.stack(), vec!["default"]);
}

#[test]
fn test_replace_alternates_states() {
    let tables = StateTableSet::builder()
        .state(
            "key",
            [
                Rule::new(r"[a-z]+", Ident),
                Rule::new(r"=", Quote).replace("value"),
            ],
        )
        .state(
            "value",
            [
                Rule::new(r"[0-9]+", Word),
                Rule::new(r";", Quote).replace("key"),
            ],
        )
        .build()
        .unwrap();
    let mut lexer = tokenize("a=1;b=22", &tables, "key").unwrap();
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert_eq!(
        tokens,
        mk_tokens(&[
            (R(Ident), "a", 0),
            (R(Quote), "=", 1),
            (R(Word), "1", 2),
            (R(Quote), ";", 3),
            (R(Ident), "b", 4),
            (R(Quote), "=", 5),
            (R(Word), "22", 6),
        ])
    );
    assert_eq!(lexer.stack(), vec!["value"]);
}

#[test]
fn test_unknown_initial_state() {
    let tables = brace_tables();
    let err = tokenize("a", &tables, "nowhere").unwrap_err();
    assert_eq!(err, LexError::UnknownState("nowhere".to_string()));
}

#[rstest]
#[case::bad_regex("states: [{ name: s, rules: [{ pattern: '(', kind: word }] }]")]
#[case::empty_match("states: [{ name: s, rules: [{ pattern: 'a*', kind: word }] }]")]
#[case::unknown_target("states: [{ name: s, rules: [{ pattern: 'a', kind: word, push: t }] }]")]
#[case::unknown_kind("states: [{ name: s, rules: [{ pattern: 'a', kind: nope }] }]")]
#[case::no_states("states: []")]
#[case::unknown_initial("initial: nowhere\nstates: [{ name: s, rules: [{ pattern: 'a', kind: word }] }]")]
fn test_invalid_definitions_are_rejected(#[case] yaml: &str) {
    let result: Result<StateTableSet<Kind>, TableError> = load_yaml(yaml);
    assert!(result.is_err());
}
