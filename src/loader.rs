// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Grammar definition loading.
//!
//! Grammars are described in JSON and compiled into the same immutable
//! [`Grammar`]/[`RuleSet`] structures an embedder could build by hand; the
//! scan engine never sees the definition format. Validation is per
//! construct: an unknown token type, a missing pattern, or an unrecognized
//! rule kind is logged with its position and skipped, and loading
//! continues. Only a definition that is unusable as a whole (unparsable
//! JSON, an empty name, no `MAIN` set) fails with [`LoadError`].

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::keywords::KeywordMap;
use crate::registry::GrammarLoader;
use crate::rule::{Action, Rule};
use crate::ruleset::{Grammar, MAIN_RULE_SET, RuleSet};
use crate::token::TokenType;

/// A grammar definition could not be used at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("grammar definition is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grammar definition has an empty name")]
    EmptyName,
    #[error("grammar `{0}` has no MAIN rule set")]
    MissingMain(String),
}

#[derive(Deserialize)]
struct GrammarDef {
    name: String,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    filenames: Vec<String>,
    rules: FxHashMap<String, RuleSetDef>,
}

#[derive(Deserialize)]
struct RuleSetDef {
    #[serde(default)]
    default: Option<String>,
    #[serde(default = "default_true")]
    ignore_case: bool,
    #[serde(default)]
    highlight_digits: bool,
    #[serde(default)]
    escape: Option<String>,
    #[serde(default)]
    terminate_char: Option<char>,
    #[serde(default)]
    keywords: FxHashMap<String, Vec<String>>,
    #[serde(default)]
    keywords_ignore_case: Option<bool>,
    #[serde(default)]
    rules: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RuleDef {
    kind: String,
    #[serde(default)]
    seq: Option<String>,
    #[serde(default)]
    begin: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default, rename = "type")]
    token: Option<String>,
    #[serde(default)]
    delegate: Option<String>,
    #[serde(default)]
    exclude_match: bool,
    #[serde(default)]
    at_line_start: bool,
    #[serde(default)]
    no_line_break: bool,
    #[serde(default)]
    no_word_break: bool,
}

fn default_true() -> bool {
    true
}

/// Parses and compiles one grammar definition.
pub fn parse_grammar(json: &str) -> Result<Grammar, LoadError> {
    let def: GrammarDef = serde_json::from_str(json)?;
    if def.name.is_empty() {
        return Err(LoadError::EmptyName);
    }
    if !def.rules.contains_key(MAIN_RULE_SET) {
        return Err(LoadError::MissingMain(def.name));
    }

    let mut grammar = Grammar::new(&def.name);
    for ext in &def.extensions {
        grammar.add_extension(ext);
    }
    for filename in &def.filenames {
        grammar.add_filename(filename);
    }

    for (set_name, set_def) in def.rules {
        let set = compile_rule_set(&def.name, &set_name, set_def);
        grammar.add_rule_set(&set_name, set);
    }
    Ok(grammar)
}

fn compile_rule_set(grammar: &str, set_name: &str, def: RuleSetDef) -> RuleSet {
    let default = match def.default.as_deref() {
        None => TokenType::Null,
        Some(name) => token_type(grammar, set_name, name).unwrap_or(TokenType::Null),
    };

    let mut set = RuleSet::new(default);
    set.set_ignore_case(def.ignore_case);
    set.set_highlight_digits(def.highlight_digits);
    if let Some(escape) = &def.escape
        && !escape.is_empty()
    {
        set.set_escape(escape);
    }
    if let Some(ch) = def.terminate_char {
        set.set_terminate_char(ch);
    }

    if !def.keywords.is_empty() {
        let mut keywords = KeywordMap::new(def.keywords_ignore_case.unwrap_or(def.ignore_case));
        for (type_name, words) in &def.keywords {
            let Some(token) = token_type(grammar, set_name, type_name) else {
                continue;
            };
            for word in words {
                keywords.add(word, token);
            }
        }
        if !keywords.is_empty() {
            set.set_keywords(keywords);
        }
    }

    for (index, value) in def.rules.into_iter().enumerate() {
        match compile_rule(grammar, set_name, index, value) {
            Some(rule) => set.add(rule),
            None => {} // already logged; keep loading
        }
    }
    set
}

fn compile_rule(
    grammar: &str,
    set_name: &str,
    index: usize,
    value: serde_json::Value,
) -> Option<Rule> {
    let def: RuleDef = match serde_json::from_value(value) {
        Ok(def) => def,
        Err(err) => {
            log::error!("{grammar}::{set_name} rule {index}: {err}; skipping");
            return None;
        }
    };

    let token = match def.token.as_deref() {
        None => TokenType::Null,
        Some(name) => token_type(grammar, set_name, name)?,
    };

    let mut hints = Action::empty();
    hints.set(Action::EXCLUDE_MATCH, def.exclude_match);
    hints.set(Action::AT_LINE_START, def.at_line_start);
    hints.set(Action::NO_LINE_BREAK, def.no_line_break);
    hints.set(Action::NO_WORD_BREAK, def.no_word_break);

    let start = def.begin.as_deref().or(def.seq.as_deref()).unwrap_or_default();
    if start.is_empty() {
        log::error!("{grammar}::{set_name} rule {index}: missing start pattern; skipping");
        return None;
    }

    match def.kind.as_str() {
        "seq" => Some(Rule::seq(start, token, hints)),
        "whitespace" => Some(Rule::whitespace(start)),
        "eol_span" => Some(Rule::eol_span(start, token, hints)),
        "mark_previous" => Some(Rule::mark_previous(start, token, hints)),
        "mark_following" => Some(Rule::mark_following(start, token, hints)),
        "span" => {
            // An absent or empty end sequence is legal: the span then only
            // closes at the line end (with NO_LINE_BREAK) or never.
            let end = def.end.as_deref().unwrap_or_default();
            match &def.delegate {
                Some(target) => {
                    let target = qualify(grammar, target);
                    Some(Rule::delegate_span(start, end, &target, token, hints))
                }
                None => Some(Rule::span(start, end, token, hints)),
            }
        }
        other => {
            log::error!("{grammar}::{set_name} rule {index}: unknown kind `{other}`; skipping");
            None
        }
    }
}

fn token_type(grammar: &str, set_name: &str, name: &str) -> Option<TokenType> {
    match TokenType::from_name(name) {
        Some(TokenType::End) | None => {
            log::error!("{grammar}::{set_name}: unknown token type `{name}`; skipping");
            None
        }
        some => some,
    }
}

/// Delegate targets may name a sibling set without the grammar prefix.
fn qualify(grammar: &str, target: &str) -> String {
    if target.contains("::") {
        target.to_string()
    } else {
        format!("{grammar}::{target}")
    }
}

/// A [`GrammarLoader`] over preloaded definition sources, for embedders
/// that handle file access themselves and want lazy compilation.
#[derive(Default)]
pub struct StaticLoader {
    sources: FxHashMap<String, String>,
}

impl StaticLoader {
    pub fn new() -> StaticLoader {
        StaticLoader::default()
    }

    /// Registers the definition source for `grammar`, compiled on first
    /// resolution.
    pub fn insert(&mut self, grammar: &str, json: &str) {
        self.sources.insert(grammar.to_string(), json.to_string());
    }
}

impl GrammarLoader for StaticLoader {
    fn load(&self, grammar: &str) -> Option<Grammar> {
        let json = self.sources.get(grammar)?;
        match parse_grammar(json) {
            Ok(grammar) => Some(grammar),
            Err(err) => {
                log::error!("failed to load grammar `{grammar}`: {err}");
                None
            }
        }
    }
}
