// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Delegation: embedded-language regions, nesting, cross-line carry, and
//! degradation when a delegate target cannot be resolved.

mod common;

use common::{marker_for, registry_with, script_grammar, spans, web_grammar};
use tokenmark::rule::{Action, Rule};
use tokenmark::ruleset::{Grammar, MAIN_RULE_SET, RuleSet};
use tokenmark::token::TokenType;

#[test]
fn delegated_text_matches_standalone_tokenization() {
    let registry = registry_with(vec![web_grammar(), script_grammar()]);

    let host_doc = ["<js>var x = 'hi'</js>"];
    let mut host = marker_for(&registry, "web", 1);
    let embedded = spans(host.mark_tokens(&host_doc, &registry, 0));

    let plain_doc = ["var x = 'hi'"];
    let mut plain = marker_for(&registry, "script", 1);
    let standalone = spans(plain.mark_tokens(&plain_doc, &registry, 0));

    // Strip the host's begin/end markers; the interior must match exactly.
    assert_eq!(embedded.first(), Some(&(4, TokenType::Markup)));
    assert_eq!(embedded.last(), Some(&(5, TokenType::Markup)));
    assert_eq!(embedded[1..embedded.len() - 1], standalone[..]);
    assert_eq!(
        standalone,
        [
            (3, TokenType::Keyword1),
            (3, TokenType::Null),
            (1, TokenType::Operator),
            (1, TokenType::Null),
            (4, TokenType::Literal1),
        ]
    );
}

#[test]
fn delegated_regions_carry_across_lines() {
    let registry = registry_with(vec![web_grammar(), script_grammar()]);
    let doc = ["<js>var a", "var b</js> tail"];
    let mut marker = marker_for(&registry, "web", doc.len());

    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 0)),
        [(4, TokenType::Markup), (3, TokenType::Keyword1), (2, TokenType::Null)]
    );
    let carried = marker.mark_tokens(&doc, &registry, 0).context().clone();
    assert!(!carried.is_top_level());
    assert_eq!(carried.rule_set().name(), "script::MAIN");

    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 1)),
        [
            (3, TokenType::Keyword1),
            (2, TokenType::Null),
            (5, TokenType::Markup),
            (5, TokenType::Null),
        ]
    );
    let after = marker.mark_tokens(&doc, &registry, 1).context().clone();
    assert!(after.is_top_level());
}

#[test]
fn delegation_nests_and_unwinds_in_order() {
    let mut outer_main = RuleSet::new(TokenType::Null);
    outer_main.add(Rule::delegate_span("{", "}", "mid::MAIN", TokenType::Markup, Action::empty()));
    let mut outer = Grammar::new("outer");
    outer.add_rule_set(MAIN_RULE_SET, outer_main);

    let mut mid_main = RuleSet::new(TokenType::Null);
    mid_main.add(Rule::delegate_span("[", "]", "inner::MAIN", TokenType::Function, Action::empty()));
    let mut mid = Grammar::new("mid");
    mid.add_rule_set(MAIN_RULE_SET, mid_main);

    let mut inner_main = RuleSet::new(TokenType::Null);
    inner_main.add(Rule::seq("!", TokenType::Operator, Action::empty()));
    let mut inner = Grammar::new("inner");
    inner.add_rule_set(MAIN_RULE_SET, inner_main);

    let registry = registry_with(vec![outer, mid, inner]);
    let doc = ["{x[!]y}z"];
    let mut marker = marker_for(&registry, "outer", 1);

    assert_eq!(
        spans(marker.mark_tokens(&doc, &registry, 0)),
        [
            (1, TokenType::Markup),
            (1, TokenType::Null),
            (1, TokenType::Function),
            (1, TokenType::Operator),
            (1, TokenType::Function),
            (1, TokenType::Null),
            (1, TokenType::Markup),
            (1, TokenType::Null),
        ]
    );
    let done = marker.mark_tokens(&doc, &registry, 0).context().clone();
    assert!(done.is_top_level());
}

#[test]
fn unresolved_delegates_degrade_to_plain_text() {
    let mut main = RuleSet::new(TokenType::Null);
    main.add(Rule::delegate_span("<js>", "</js>", "ghost::MAIN", TokenType::Markup, Action::empty()));
    let mut grammar = Grammar::new("lonely");
    grammar.add_rule_set(MAIN_RULE_SET, main);

    let registry = registry_with(vec![grammar]);
    let doc = ["<js>x</js>"];
    let mut marker = marker_for(&registry, "lonely", 1);

    // The trigger is consumed as default text, no region opens, no panic.
    assert_eq!(spans(marker.mark_tokens(&doc, &registry, 0)), [(10, TokenType::Null)]);
    assert!(marker.mark_tokens(&doc, &registry, 0).context().is_top_level());
    assert!(registry.rule_set("ghost::MAIN").is_none());
}
