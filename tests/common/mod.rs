// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Shared grammars and helpers for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use tokenmark::document::{Document, ReadError};
use tokenmark::keywords::KeywordMap;
use tokenmark::marker::{LineInfo, TokenMarker};
use tokenmark::registry::Registry;
use tokenmark::rule::{Action, Rule};
use tokenmark::ruleset::{Grammar, MAIN_RULE_SET, RuleSet};
use tokenmark::token::TokenType;

/// A small C-flavored grammar: block and line comments, strings with
/// escapes, a few keywords, digit highlighting.
pub fn c_grammar() -> Grammar {
    let mut main = RuleSet::new(TokenType::Null);
    main.set_ignore_case(false);
    main.set_highlight_digits(true);
    main.set_escape("\\");

    let mut keywords = KeywordMap::new(false);
    keywords.add("if", TokenType::Keyword1);
    keywords.add("else", TokenType::Keyword1);
    keywords.add("while", TokenType::Keyword1);
    keywords.add("return", TokenType::Keyword1);
    keywords.add("int", TokenType::Keyword3);
    keywords.add("char", TokenType::Keyword3);
    main.set_keywords(keywords);

    main.add(Rule::whitespace(" "));
    main.add(Rule::whitespace("\t"));
    main.add(Rule::span("/*", "*/", TokenType::Comment1, Action::empty()));
    main.add(Rule::eol_span("//", TokenType::Comment1, Action::empty()));
    main.add(Rule::span("\"", "\"", TokenType::Literal1, Action::NO_LINE_BREAK));
    main.add(Rule::seq("=", TokenType::Operator, Action::empty()));
    main.add(Rule::seq("+", TokenType::Operator, Action::empty()));
    main.add(Rule::seq(";", TokenType::Operator, Action::empty()));

    let mut grammar = Grammar::new("c");
    grammar.add_extension("c");
    grammar.add_rule_set(MAIN_RULE_SET, main);
    grammar
}

/// A host grammar embedding `script` between `<js>` and `</js>` markers.
pub fn web_grammar() -> Grammar {
    let mut main = RuleSet::new(TokenType::Null);
    main.set_ignore_case(false);
    main.add(Rule::whitespace(" "));
    main.add(Rule::delegate_span(
        "<js>",
        "</js>",
        "script::MAIN",
        TokenType::Markup,
        Action::empty(),
    ));

    let mut grammar = Grammar::new("web");
    grammar.add_rule_set(MAIN_RULE_SET, main);
    grammar
}

/// The embedded language: keywords, single-quoted strings, one operator.
pub fn script_grammar() -> Grammar {
    let mut main = RuleSet::new(TokenType::Null);
    main.set_ignore_case(false);

    let mut keywords = KeywordMap::new(false);
    keywords.add("var", TokenType::Keyword1);
    main.set_keywords(keywords);

    main.add(Rule::whitespace(" "));
    main.add(Rule::span("'", "'", TokenType::Literal1, Action::NO_LINE_BREAK));
    main.add(Rule::seq("=", TokenType::Operator, Action::empty()));

    let mut grammar = Grammar::new("script");
    grammar.add_rule_set(MAIN_RULE_SET, main);
    grammar
}

pub fn registry_with(grammars: Vec<Grammar>) -> Registry {
    let registry = Registry::new();
    for grammar in grammars {
        registry.register(grammar);
    }
    registry
}

/// A marker sized for `lines` whose main set is `grammar::MAIN`.
pub fn marker_for(registry: &Registry, grammar: &str, lines: usize) -> TokenMarker {
    let main = registry.main_rule_set(grammar).expect("grammar is registered");
    let mut marker = TokenMarker::new(main);
    marker.insert_lines(0, lines);
    marker
}

/// Token spans as `(len, type)` pairs, without the End sentinel.
pub fn spans(info: &LineInfo) -> Vec<(usize, TokenType)> {
    info.tokens()
        .iter()
        .filter(|t| t.ty != TokenType::End)
        .map(|t| (t.len, t.ty))
        .collect()
}

/// A document that records which lines were fetched.
pub struct CountingDoc {
    pub lines: Vec<String>,
    pub reads: RefCell<Vec<usize>>,
}

impl CountingDoc {
    pub fn new(lines: &[&str]) -> CountingDoc {
        CountingDoc {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            reads: RefCell::new(Vec::new()),
        }
    }

    pub fn take_reads(&self) -> Vec<usize> {
        std::mem::take(&mut *self.reads.borrow_mut())
    }
}

impl Document for CountingDoc {
    fn read_line(&self, line: usize, out: &mut String) -> Result<(), ReadError> {
        self.reads.borrow_mut().push(line);
        let text = self.lines.get(line).ok_or(ReadError::OutOfBounds(line))?;
        out.push_str(text);
        Ok(())
    }
}
