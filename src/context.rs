// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Cross-line scan state.
//!
//! A [`LineContext`] is the minimal state needed to resume tokenizing at the
//! start of the next line: the span rule currently open (if any), the rule
//! set in effect, and (when inside a delegated region) the parent context
//! that will reclaim control once its end sequence matches. The parent chain
//! is a strict stack: each delegation level consumes at least one character,
//! so its depth is bounded by line length regardless of grammar structure.

use std::fmt;
use std::sync::Arc;

use crate::rule::Rule;
use crate::ruleset::RuleSet;

/// The resume state at a line boundary.
///
/// Cloning is deep along the parent chain; rule and rule-set references stay
/// shared. Every cached line owns its own snapshot, because contexts mutate
/// while the following line is scanned.
#[derive(Clone)]
pub struct LineContext {
    pub(crate) parent: Option<Box<LineContext>>,
    pub(crate) in_rule: Option<Arc<Rule>>,
    pub(crate) rules: Arc<RuleSet>,
}

impl LineContext {
    /// A top-level context: the given rule set, no open rule.
    pub fn new(rules: Arc<RuleSet>) -> LineContext {
        LineContext { parent: None, in_rule: None, rules }
    }

    /// Enters a delegated region: the delegate's rule set becomes active and
    /// `parent` (whose open rule is the delegating span) is pushed.
    pub(crate) fn delegated(rules: Arc<RuleSet>, parent: LineContext) -> LineContext {
        LineContext { parent: Some(Box::new(parent)), in_rule: None, rules }
    }

    /// The rule set rules are currently drawn from.
    pub fn rule_set(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// True when not inside any delegated region.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Structural equality: same open-rule identity, same rule-set identity,
    /// same parent chain shape. Reference equality of the containers is
    /// meaningless because cached contexts are clones.
    pub fn same_shape(&self, other: &LineContext) -> bool {
        fn rule_eq(a: &Option<Arc<Rule>>, b: &Option<Arc<Rule>>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
        }

        rule_eq(&self.in_rule, &other.in_rule)
            && Arc::ptr_eq(&self.rules, &other.rules)
            && match (&self.parent, &other.parent) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same_shape(b),
                _ => false,
            }
    }
}

impl fmt::Debug for LineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut ctx = self;
        while let Some(parent) = &ctx.parent {
            depth += 1;
            ctx = parent;
        }
        f.debug_struct("LineContext")
            .field("rules", &self.rules.name())
            .field("in_rule", &self.in_rule.is_some())
            .field("depth", &depth)
            .finish()
    }
}
