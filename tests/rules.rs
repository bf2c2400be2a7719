// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Individual rule behaviors observed through the public API: escapes,
//! unterminated spans, retro/forward marking, line anchoring, early
//! termination, and case folding.

mod common;

use common::{c_grammar, marker_for, registry_with, spans};
use tokenmark::keywords::KeywordMap;
use tokenmark::registry::Registry;
use tokenmark::rule::{Action, Rule};
use tokenmark::ruleset::{Grammar, MAIN_RULE_SET, RuleSet};
use tokenmark::token::TokenType;

fn single_set_registry(name: &str, set: RuleSet) -> Registry {
    let mut grammar = Grammar::new(name);
    grammar.add_rule_set(MAIN_RULE_SET, set);
    registry_with(vec![grammar])
}

#[test]
fn escapes_suppress_span_ends() {
    let registry = registry_with(vec![c_grammar()]);
    let doc = [r#""a\"b""#, r#""\\" x"#];
    let mut marker = marker_for(&registry, "c", doc.len());

    // The escaped quote does not close the string.
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 0)), [(6, TokenType::Literal1)]);
    // An escaped escape does: the string is two characters wide.
    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 1)),
        [(4, TokenType::Literal1), (2, TokenType::Null)]
    );
}

#[test]
fn unterminated_strings_degrade_to_invalid() {
    let registry = registry_with(vec![c_grammar()]);
    let doc = ["\"abc", "int x;"];
    let mut marker = marker_for(&registry, "c", doc.len());

    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 0)), [(4, TokenType::Invalid)]);
    // The forced close keeps the damage to one line.
    let line0 = marker.mark_tokens(&doc, &registry, 0).context().clone();
    assert!(line0.is_top_level());
    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 1)),
        [(3, TokenType::Keyword3), (2, TokenType::Null), (1, TokenType::Operator)]
    );
}

#[test]
fn mark_previous_tags_backwards() {
    let mut set = RuleSet::new(TokenType::Null);
    set.add(Rule::mark_previous(":", TokenType::Label, Action::empty()));
    let registry = single_set_registry("labels", set);

    let doc = ["start:"];
    let mut marker = marker_for(&registry, "labels", 1);
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 0)), [(6, TokenType::Label)]);
}

#[test]
fn line_start_anchored_rules() {
    let mut set = RuleSet::new(TokenType::Null);
    set.add(Rule::eol_span("#", TokenType::Comment1, Action::AT_LINE_START));
    let registry = single_set_registry("hash", set);

    let doc = ["#comment", "a#comment"];
    let mut marker = marker_for(&registry, "hash", doc.len());
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 0)), [(8, TokenType::Comment1)]);
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 1)), [(9, TokenType::Null)]);
}

#[test]
fn terminate_char_stops_the_scan() {
    let mut set = RuleSet::new(TokenType::Null);
    set.add(Rule::seq("+", TokenType::Operator, Action::empty()));
    set.set_terminate_char(';');
    let registry = single_set_registry("early", set);

    let doc = ["a + b; c + d"];
    let mut marker = marker_for(&registry, "early", 1);
    // Nothing after the terminator is classified.
    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 0)),
        [(2, TokenType::Null), (1, TokenType::Operator), (9, TokenType::Null)]
    );
}

#[test]
fn soft_spans_close_at_separators() {
    let mut set = RuleSet::new(TokenType::Null);
    set.add(Rule::whitespace(" "));
    set.add(Rule::mark_following("$", TokenType::Keyword2, Action::empty()));
    let registry = single_set_registry("vars", set);

    let doc = ["$var x", "$tail"];
    let mut marker = marker_for(&registry, "vars", doc.len());
    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 0)),
        [(4, TokenType::Keyword2), (2, TokenType::Null)]
    );
    // At the line end the soft span closes instead of carrying over.
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 1)), [(5, TokenType::Keyword2)]);
    let ctx = marker.mark_tokens(&doc, &registry, 1).context().clone();
    assert!(ctx.is_top_level());
}

#[test]
fn case_insensitive_sets_fold_patterns_and_keywords() {
    let mut set = RuleSet::new(TokenType::Null);
    set.set_ignore_case(true);
    let mut keywords = KeywordMap::new(true);
    keywords.add("select", TokenType::Keyword1);
    set.set_keywords(keywords);
    set.add(Rule::whitespace(" "));
    set.add(Rule::eol_span("REM", TokenType::Comment1, Action::empty()));
    let registry = single_set_registry("sql", set);

    let doc = ["SELECT x", "rem note"];
    let mut marker = marker_for(&registry, "sql", doc.len());
    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 0)),
        [(6, TokenType::Keyword1), (2, TokenType::Null)]
    );
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 1)), [(8, TokenType::Comment1)]);
}
