// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Incremental, rule-driven syntax tokenizer for text editors.
//!
//! Grammars are collections of [`ruleset::RuleSet`]s (ordered literal
//! matchers plus keyword maps) registered in a [`registry::Registry`]. A
//! per-document [`marker::TokenMarker`] turns lines into typed token spans,
//! carrying a [`context::LineContext`] across line boundaries so multi-line
//! constructs (block comments, strings, delegated embedded languages) are
//! classified correctly, and caches per-line results so an edit re-scans
//! only the lines whose incoming context actually changed.
//!
//! The crate performs no I/O and owns no threads; it is pure computation
//! over characters supplied through the [`document::Document`] trait.

pub mod context;
pub mod document;
mod engine;
pub mod keywords;
pub mod loader;
pub mod marker;
pub mod registry;
pub mod rule;
pub mod ruleset;
pub mod token;
