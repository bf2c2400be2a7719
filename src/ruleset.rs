// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Rule sets and grammars.
//!
//! A [`RuleSet`] owns an ordered collection of rules bucketed by their first
//! character, plus set-level settings: keyword map, default token type, case
//! sensitivity, digit highlighting, an optional escape rule, and an optional
//! terminate character. A [`Grammar`] is a named collection of rule sets;
//! the set named `MAIN` is the entry point. Both are frozen behind `Arc`
//! once registered and shared by every document using the grammar.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::keywords::KeywordMap;
use crate::rule::Rule;
use crate::token::TokenType;

/// The entry-point rule set name of every grammar.
pub const MAIN_RULE_SET: &str = "MAIN";

/// An ordered, first-character-indexed collection of rules plus set-level
/// lexing settings.
pub struct RuleSet {
    name: String,
    buckets: FxHashMap<char, Vec<Arc<Rule>>>,
    keywords: Option<KeywordMap>,
    default: TokenType,
    ignore_case: bool,
    highlight_digits: bool,
    escape: Option<Arc<Rule>>,
    terminate_char: Option<char>,
}

impl RuleSet {
    pub fn new(default: TokenType) -> RuleSet {
        RuleSet {
            name: String::new(),
            buckets: FxHashMap::default(),
            keywords: None,
            default,
            ignore_case: true,
            highlight_digits: false,
            escape: None,
            terminate_char: None,
        }
    }

    /// Appends a rule. Order within a first-character bucket is priority
    /// order. A rule with an empty start pattern can never match and is
    /// dropped with a warning.
    pub fn add(&mut self, rule: Rule) {
        let Some(&first) = rule.start_pattern().first() else {
            log::warn!("dropping rule with an empty start pattern in {:?}", self.name);
            return;
        };
        self.buckets.entry(bucket_key(first)).or_default().push(Arc::new(rule));
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        self.ignore_case = ignore_case;
    }

    pub fn set_highlight_digits(&mut self, highlight_digits: bool) {
        self.highlight_digits = highlight_digits;
    }

    /// Installs the escape sequence tested ahead of all other processing.
    pub fn set_escape(&mut self, seq: &str) {
        self.escape = Some(Arc::new(Rule::escape(seq)));
    }

    /// A raw character past which the line scan stops early, checked only
    /// between completed matches and outside any open rule.
    pub fn set_terminate_char(&mut self, ch: char) {
        self.terminate_char = Some(ch);
    }

    pub fn set_keywords(&mut self, keywords: KeywordMap) {
        self.keywords = Some(keywords);
    }

    /// The `Grammar::SET` identity, assigned at registration.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rules_for(&self, ch: char) -> &[Arc<Rule>] {
        self.buckets.get(&bucket_key(ch)).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn keywords(&self) -> Option<&KeywordMap> {
        self.keywords.as_ref()
    }

    pub(crate) fn default_type(&self) -> TokenType {
        self.default
    }

    pub(crate) fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub(crate) fn highlight_digits(&self) -> bool {
        self.highlight_digits
    }

    pub(crate) fn escape_rule(&self) -> Option<&Arc<Rule>> {
        self.escape.as_ref()
    }

    pub(crate) fn terminate_char(&self) -> Option<char> {
        self.terminate_char
    }
}

/// Buckets are keyed case-folded; the per-rule pattern comparison settles
/// case sensitivity, the bucket is only a pre-filter.
fn bucket_key(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// A named collection of rule sets defining how to tokenize one language,
/// plus the file-name metadata used to pick a grammar for a path.
pub struct Grammar {
    name: String,
    sets: FxHashMap<String, Arc<RuleSet>>,
    extensions: Vec<String>,
    filenames: Vec<String>,
}

impl Grammar {
    pub fn new(name: &str) -> Grammar {
        Grammar {
            name: name.to_string(),
            sets: FxHashMap::default(),
            extensions: Vec::new(),
            filenames: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a rule set under `set_name`, stamping its qualified
    /// identity. Replaces any previous set of the same name.
    pub fn add_rule_set(&mut self, set_name: &str, mut set: RuleSet) {
        set.name = format!("{}::{}", self.name, set_name);
        self.sets.insert(set_name.to_string(), Arc::new(set));
    }

    pub fn rule_set(&self, set_name: &str) -> Option<Arc<RuleSet>> {
        self.sets.get(set_name).cloned()
    }

    pub fn main(&self) -> Option<Arc<RuleSet>> {
        self.rule_set(MAIN_RULE_SET)
    }

    /// A file extension (without the dot) this grammar applies to.
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// An exact file name this grammar applies to, e.g. `Makefile`.
    pub fn add_filename(&mut self, name: &str) {
        self.filenames.push(name.to_string());
    }

    pub(crate) fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    pub(crate) fn matches_filename(&self, name: &str) -> bool {
        self.filenames.iter().any(|f| f == name)
    }
}
