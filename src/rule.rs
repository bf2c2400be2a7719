// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Lexical rules: immutable matchers pairing literal patterns with a token
//! type and behavior flags.
//!
//! A rule carries one or two character sequences (a start pattern, and for
//! spans an end pattern), the token type it produces, and an [`Action`]
//! bitset. The low bits select exactly one major action; the high bits are
//! modifier hints. Rules are built once, shared by reference, and never
//! mutated afterwards.

use bitflags::bitflags;

use crate::token::TokenType;

bitflags! {
    /// Behavior flags of a [`Rule`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Action: u16 {
        // Major actions. At most one is set; none means a plain sequence.
        /// Word separator: resets the keyword-run boundary without emitting
        /// a token of its own.
        const WHITESPACE = 1 << 0;
        /// Region with explicit begin and end sequences.
        const SPAN = 1 << 1;
        /// Retroactively tags the text since the last keyword boundary.
        const MARK_PREVIOUS = 1 << 2;
        /// Soft span: tags following text until a word break or another
        /// rule match.
        const MARK_FOLLOWING = 1 << 3;
        /// Consumes from the match to the physical end of the line.
        const EOL_SPAN = 1 << 4;

        // Modifier hints.
        /// Keep the matched sequence out of the produced token.
        const EXCLUDE_MATCH = 1 << 8;
        /// Only match at the start of the line.
        const AT_LINE_START = 1 << 9;
        /// The span may not cross a line boundary.
        const NO_LINE_BREAK = 1 << 10;
        /// The span may not cross a word boundary.
        const NO_WORD_BREAK = 1 << 11;
        /// Escape introducer: suppresses rule evaluation for the next match.
        const IS_ESCAPE = 1 << 12;
        /// The span hands its interior to another named rule set.
        const DELEGATE = 1 << 13;
    }
}

impl Action {
    pub(crate) const MAJOR: Action = Action::WHITESPACE
        .union(Action::SPAN)
        .union(Action::MARK_PREVIOUS)
        .union(Action::MARK_FOLLOWING)
        .union(Action::EOL_SPAN);

    /// Spans that may be closed implicitly at a word boundary instead of by
    /// an explicit end match.
    pub(crate) const SOFT_SPAN: Action = Action::MARK_FOLLOWING.union(Action::NO_WORD_BREAK);

    const HINTS: Action = Action::EXCLUDE_MATCH
        .union(Action::AT_LINE_START)
        .union(Action::NO_LINE_BREAK)
        .union(Action::NO_WORD_BREAK);
}

/// An immutable lexical matcher.
#[derive(Debug)]
pub struct Rule {
    action: Action,
    token: TokenType,
    start: Box<[char]>,
    end: Box<[char]>,
    delegate: Option<String>,
}

impl Rule {
    fn build(major: Action, hints: Action, token: TokenType, start: &str, end: &str) -> Rule {
        debug_assert!(Action::HINTS.contains(hints), "only modifier hints may be passed");
        Rule {
            action: major | (hints & Action::HINTS),
            token,
            start: start.chars().collect(),
            end: end.chars().collect(),
            delegate: None,
        }
    }

    /// A plain literal sequence.
    pub fn seq(seq: &str, token: TokenType, hints: Action) -> Rule {
        Rule::build(Action::empty(), hints, token, seq, "")
    }

    /// A word separator. Matched text folds into the surrounding
    /// default-type token.
    pub fn whitespace(seq: &str) -> Rule {
        Rule::build(Action::WHITESPACE, Action::empty(), TokenType::Null, seq, "")
    }

    /// A region with explicit begin and end sequences (block comment,
    /// string literal). An empty end sequence never matches; combined with
    /// [`Action::NO_LINE_BREAK`] it closes the span at the line end.
    pub fn span(begin: &str, end: &str, token: TokenType, hints: Action) -> Rule {
        Rule::build(Action::SPAN, hints, token, begin, end)
    }

    /// A span whose interior is tokenized by another named rule set.
    /// `target` is a qualified `Grammar::SET` name, resolved lazily.
    pub fn delegate_span(
        begin: &str,
        end: &str,
        target: &str,
        token: TokenType,
        hints: Action,
    ) -> Rule {
        let mut rule = Rule::build(Action::SPAN | Action::DELEGATE, hints, token, begin, end);
        rule.delegate = Some(target.to_string());
        rule
    }

    /// Consumes from the match to the physical end of the line.
    pub fn eol_span(seq: &str, token: TokenType, hints: Action) -> Rule {
        Rule::build(Action::EOL_SPAN, hints, token, seq, "")
    }

    /// Retroactively tags the text between the last keyword boundary and the
    /// match, plus the matched text itself, as one token.
    pub fn mark_previous(seq: &str, token: TokenType, hints: Action) -> Rule {
        Rule::build(Action::MARK_PREVIOUS, hints, token, seq, "")
    }

    /// Opens a soft span that closes at the next word break or rule match.
    pub fn mark_following(seq: &str, token: TokenType, hints: Action) -> Rule {
        Rule::build(Action::MARK_FOLLOWING, hints, token, seq, "")
    }

    pub(crate) fn escape(seq: &str) -> Rule {
        Rule::build(Action::IS_ESCAPE, Action::empty(), TokenType::Null, seq, "")
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn token(&self) -> TokenType {
        self.token
    }

    pub fn start_pattern(&self) -> &[char] {
        &self.start
    }

    pub fn end_pattern(&self) -> &[char] {
        &self.end
    }

    pub fn delegate_target(&self) -> Option<&str> {
        self.delegate.as_deref()
    }
}
