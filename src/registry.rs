// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! The grammar registry: qualified-name resolution with idempotent caching.
//!
//! Rule sets are addressed as `Grammar::SET`. Resolution consults registered
//! grammars first, then an optional [`GrammarLoader`] for grammars that have
//! not been parsed yet. Results, including failures, are cached, so a
//! delegate rule fired on every repaint never repeats the lookup, and an
//! unresolved target is logged once per distinct name. Resolution never
//! holds the registry lock across a loader call, so a loader may re-enter
//! the registry.
//!
//! The registry is an explicit value owned by the embedding application and
//! passed to the tokenizer by reference; dropping it tears down every
//! grammar it owns.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

use crate::ruleset::{Grammar, MAIN_RULE_SET, RuleSet};

/// Supplies grammar definitions on demand, keyed by grammar name.
pub trait GrammarLoader: Send {
    /// Returns the parsed grammar, or `None` if the name is unknown or the
    /// definition is unusable (the loader is expected to log the cause).
    fn load(&self, grammar: &str) -> Option<Grammar>;
}

#[derive(Default)]
struct State {
    grammars: FxHashMap<String, Grammar>,
    resolved: FxHashMap<String, Option<Arc<RuleSet>>>,
    logged: FxHashSet<String>,
}

/// Registered grammars plus the resolution cache.
#[derive(Default)]
pub struct Registry {
    state: Mutex<State>,
    loader: Option<Box<dyn GrammarLoader>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn with_loader(loader: Box<dyn GrammarLoader>) -> Registry {
        Registry { state: Mutex::default(), loader: Some(loader) }
    }

    /// Registers (or replaces) a grammar. The resolution cache is reset so a
    /// reload takes effect for subsequent lookups; rule sets already held by
    /// open documents keep their old definitions until re-resolved.
    pub fn register(&self, grammar: Grammar) {
        let mut state = self.lock();
        state.resolved.clear();
        state.logged.clear();
        state.grammars.insert(grammar.name().to_string(), grammar);
    }

    /// Resolves a qualified `Grammar::SET` name. Failures are cached and
    /// logged once per distinct name; the caller degrades per its own
    /// policy, resolution itself never panics.
    pub fn rule_set(&self, qualified: &str) -> Option<Arc<RuleSet>> {
        {
            let state = self.lock();
            if let Some(hit) = state.resolved.get(qualified) {
                return hit.clone();
            }
        }

        let resolved = self.resolve_uncached(qualified);

        let mut state = self.lock();
        if resolved.is_none() && state.logged.insert(qualified.to_string()) {
            log::error!("unresolved delegate target: {qualified}");
        }
        // First insert wins, so concurrent or re-entrant resolution of the
        // same name yields one shared reference.
        state.resolved.entry(qualified.to_string()).or_insert(resolved).clone()
    }

    /// Shorthand for resolving a grammar's `MAIN` rule set.
    pub fn main_rule_set(&self, grammar: &str) -> Option<Arc<RuleSet>> {
        self.rule_set(&format!("{grammar}::{MAIN_RULE_SET}"))
    }

    /// Picks a registered grammar for a file path: exact file-name entries
    /// first, then extensions. Returns the grammar name.
    pub fn grammar_for_path(&self, path: &Path) -> Option<String> {
        let filename = path.file_name()?.to_str()?;
        let ext = path.extension().and_then(|e| e.to_str());

        let state = self.lock();
        for grammar in state.grammars.values() {
            if grammar.matches_filename(filename) {
                return Some(grammar.name().to_string());
            }
        }
        let ext = ext?;
        for grammar in state.grammars.values() {
            if grammar.matches_extension(ext) {
                return Some(grammar.name().to_string());
            }
        }
        None
    }

    fn resolve_uncached(&self, qualified: &str) -> Option<Arc<RuleSet>> {
        let Some((grammar_name, set_name)) = qualified.split_once("::") else {
            log::error!("malformed rule set name (expected Grammar::SET): {qualified}");
            return None;
        };

        {
            let state = self.lock();
            if let Some(grammar) = state.grammars.get(grammar_name) {
                return grammar.rule_set(set_name);
            }
        }

        // Not registered: ask the loader, without holding the lock.
        let loaded = self.loader.as_ref()?.load(grammar_name)?;
        let mut state = self.lock();
        let grammar = state.grammars.entry(grammar_name.to_string()).or_insert(loaded);
        grammar.rule_set(set_name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
