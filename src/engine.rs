// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! The line scanner.
//!
//! [`scan_line`] turns one line of characters plus the context carried over
//! from the previous line into a token sequence and the context to carry
//! into the next line. Per position, checks run in a fixed priority order:
//! the enclosing delegation's end sequence, the active set's escape rule,
//! the open span's end sequence, then the ordered rule list for the current
//! character, with keyword/digit classification as the fallback for text no
//! rule claims.
//!
//! All scan state lives in a [`Scanner`] value local to the call; nothing
//! is carried in long-lived fields, so independent documents can never
//! cross-contaminate.

use std::sync::Arc;

use crate::context::LineContext;
use crate::registry::Registry;
use crate::rule::{Action, Rule};
use crate::token::{TokenType, Tokens};

/// Which of a rule's patterns to test.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Start,
    End,
}

/// Scans `line`, appending its tokens to `tokens` (without the terminating
/// sentinel) and returning the outgoing context.
pub(crate) fn scan_line(
    line: &[char],
    incoming: LineContext,
    registry: &Registry,
    tokens: &mut Tokens,
) -> LineContext {
    let mut scanner = Scanner {
        line,
        pos: 0,
        last_offset: 0,
        last_keyword: 0,
        escaped: false,
        context: incoming,
        registry,
        tokens,
    };
    scanner.run();
    scanner.context
}

/// Per-call scan state: the cursor, the flush boundaries, the escape flag,
/// and the evolving context.
struct Scanner<'a, 'r> {
    line: &'a [char],
    /// Current scan position.
    pos: usize,
    /// Start of text not yet covered by a token.
    last_offset: usize,
    /// Start of the pending keyword-candidate run.
    last_keyword: usize,
    /// The previous match was an escape; the next match is consumed inert.
    escaped: bool,
    context: LineContext,
    registry: &'r Registry,
    tokens: &'a mut Tokens,
}

impl Scanner<'_, '_> {
    fn run(&mut self) {
        let line_len = self.line.len();

        'line: while self.pos < line_len {
            // The labeled block stands in for "continue", so the position
            // still advances by one below on every early exit.
            'position: {
                // Stop early on the set's terminate character; only between
                // completed matches, never inside an open rule or a
                // delegated region.
                if self.context.is_top_level()
                    && self.context.in_rule.is_none()
                    && !self.escaped
                    && self.context.rules.terminate_char() == Some(self.line[self.pos])
                {
                    break 'line;
                }

                // Inside a delegated region the parent grammar's closing
                // sequence outranks every child rule.
                if !self.context.is_top_level() && self.close_delegate() {
                    break 'position;
                }

                // The escape rule outranks span and keyword processing.
                if let Some(escape) = self.context.rules.escape_rule().cloned()
                    && self.matches_here(escape.start_pattern(), self.context.rules.ignore_case())
                {
                    self.escaped = !self.escaped;
                    self.pos += escape.start_pattern().len() - 1;
                    break 'position;
                }

                // An open span checks its end sequence next. Hard spans
                // consume character by character until it matches; soft
                // spans fall through to the rule list.
                if let Some(rule) = self.context.in_rule.clone()
                    && rule.action().contains(Action::SPAN)
                {
                    let matched = self.handle_rule(&rule, Pattern::End);
                    if matched || !rule.action().intersects(Action::SOFT_SPAN) {
                        self.escaped = false;
                        break 'position;
                    }
                }

                // The ordered rule list for the current character.
                let rules = self.context.rules.clone();
                for rule in rules.rules_for(self.line[self.pos]) {
                    let which = match &self.context.in_rule {
                        Some(open) if Arc::ptr_eq(open, rule) && rule.action().contains(Action::SPAN) => {
                            Pattern::End
                        }
                        _ => Pattern::Start,
                    };
                    if self.handle_rule(rule, which) {
                        break;
                    }
                }

                self.escaped = false;
            }

            self.pos += 1;
        }

        // Pending keyword run at the line's end.
        if self.context.in_rule.is_none() {
            self.mark_keyword(self.last_keyword, line_len);
        }

        // Flush whatever remains, then settle spans that may not cross the
        // line boundary.
        let remainder = line_len - self.last_offset;
        match self.context.in_rule.clone() {
            None => {
                self.tokens.push(remainder, self.context.rules.default_type());
            }
            Some(rule) => {
                let action = rule.action();
                if action.contains(Action::SPAN)
                    && action.intersects(Action::NO_LINE_BREAK | Action::NO_WORD_BREAK)
                {
                    // Unterminated span: visibly wrong, never fatal.
                    self.tokens.push(remainder, TokenType::Invalid);
                    self.context.in_rule = None;
                } else if remainder > 0 {
                    self.tokens.push(remainder, rule.token());
                    if action.contains(Action::MARK_FOLLOWING) {
                        self.context.in_rule = None;
                    }
                }
            }
        }
    }

    /// Tests the enclosing delegation's end sequence at the current
    /// position and, on a match, closes the delegated region: flushes the
    /// interior, pops the context, and emits the end sequence. Returns true
    /// when the position was consumed.
    fn close_delegate(&mut self) -> bool {
        let Some(parent_rule) = self.context.parent.as_ref().and_then(|p| p.in_rule.clone()) else {
            return false;
        };
        let end = parent_rule.end_pattern();
        let parent_ignore_case =
            self.context.parent.as_ref().map(|p| p.rules.ignore_case()).unwrap_or(false);
        if !self.matches_here(end, parent_ignore_case) {
            return false;
        }

        if self.escaped {
            self.escaped = false;
            self.pos += end.len() - 1;
            return true;
        }

        // Flush the text accumulated inside the delegated region.
        if self.pos != self.last_offset {
            match self.context.in_rule.clone() {
                None => {
                    self.mark_keyword(self.last_keyword, self.pos);
                    self.tokens
                        .push(self.pos - self.last_offset, self.context.rules.default_type());
                }
                Some(open)
                    if !open
                        .action()
                        .intersects(Action::NO_LINE_BREAK | Action::NO_WORD_BREAK) =>
                {
                    self.tokens.push(self.pos - self.last_offset, open.token());
                }
                Some(_) => {
                    self.tokens.push(self.pos - self.last_offset, TokenType::Invalid);
                }
            }
        }

        // Pop back into the delegating grammar.
        let parent = self.context.parent.take().expect("checked above");
        self.context = *parent;

        if parent_rule.action().contains(Action::EXCLUDE_MATCH) {
            self.tokens.push(end.len(), self.context.rules.default_type());
        } else {
            self.tokens.push(end.len(), parent_rule.token());
        }
        self.context.in_rule = None;

        self.last_offset = self.pos + end.len();
        self.last_keyword = self.last_offset;
        self.pos += end.len() - 1;
        true
    }

    /// Tests `rule`'s selected pattern at the current position and, on a
    /// match, applies its action. Returns true when the rule matched (stop
    /// checking further rules for this position).
    fn handle_rule(&mut self, rule: &Arc<Rule>, which: Pattern) -> bool {
        let pattern: &[char] = match which {
            Pattern::Start => rule.start_pattern(),
            Pattern::End => rule.end_pattern(),
        };
        if !self.matches_here(pattern, self.context.rules.ignore_case()) {
            return false;
        }
        let plen = pattern.len();

        // An escaped match is consumed without taking effect.
        if self.escaped {
            self.pos += plen - 1;
            return true;
        }

        // An open soft span yields to any unrelated match: it closes at the
        // current position before the new rule's action runs.
        if let Some(open) = self.context.in_rule.clone()
            && !Arc::ptr_eq(&open, rule)
            && open.action().intersects(Action::SOFT_SPAN)
        {
            if open.action().contains(Action::NO_WORD_BREAK) {
                self.tokens.push(self.pos - self.last_offset, TokenType::Invalid);
            } else {
                self.tokens.push(self.pos - self.last_offset, open.token());
            }
            self.last_offset = self.pos;
            self.last_keyword = self.pos;
            self.context.in_rule = None;
        }

        if self.context.in_rule.is_none() {
            let action = rule.action();

            if action.contains(Action::AT_LINE_START) {
                let anchor = if action.contains(Action::MARK_PREVIOUS) {
                    self.last_keyword
                } else {
                    self.pos
                };
                if anchor != 0 {
                    return false;
                }
            }

            self.mark_keyword(self.last_keyword, self.pos);

            if !action.contains(Action::MARK_PREVIOUS) {
                self.last_keyword = self.pos + plen;

                if action.contains(Action::WHITESPACE) {
                    return true;
                }

                if self.last_offset < self.pos {
                    self.tokens
                        .push(self.pos - self.last_offset, self.context.rules.default_type());
                }
            }

            let major = action & Action::MAJOR;
            if major.is_empty() {
                // Plain sequence.
                self.tokens.push(plen, rule.token());
                self.last_offset = self.pos + plen;
            } else if major == Action::SPAN {
                self.open_span(rule, plen);
            } else if major == Action::EOL_SPAN {
                let line_len = self.line.len();
                if action.contains(Action::EXCLUDE_MATCH) {
                    self.tokens.push(plen, self.context.rules.default_type());
                    self.tokens.push(line_len - (self.pos + plen), rule.token());
                } else {
                    self.tokens.push(line_len - self.pos, rule.token());
                }
                self.last_offset = line_len;
                self.last_keyword = line_len;
                self.pos = line_len;
                return true;
            } else if major == Action::MARK_PREVIOUS {
                if self.last_keyword > self.last_offset {
                    self.tokens.push(
                        self.last_keyword - self.last_offset,
                        self.context.rules.default_type(),
                    );
                    self.last_offset = self.last_keyword;
                }
                if action.contains(Action::EXCLUDE_MATCH) {
                    self.tokens.push(self.pos - self.last_offset, rule.token());
                    self.tokens.push(plen, self.context.rules.default_type());
                } else {
                    self.tokens.push(self.pos - self.last_offset + plen, rule.token());
                }
                self.last_offset = self.pos + plen;
            } else if major == Action::MARK_FOLLOWING {
                self.context.in_rule = Some(rule.clone());
                if action.contains(Action::EXCLUDE_MATCH) {
                    self.tokens.push(plen, self.context.rules.default_type());
                    self.last_offset = self.pos + plen;
                } else {
                    self.last_offset = self.pos;
                }
            } else {
                unreachable!("rule carries more than one major action");
            }

            self.last_keyword = self.last_offset;
            self.pos += plen - 1;
            true
        } else if rule.action().contains(Action::SPAN) {
            // The open span's end sequence.
            if !rule.action().contains(Action::DELEGATE) {
                self.context.in_rule = None;
                if rule.action().contains(Action::EXCLUDE_MATCH) {
                    self.tokens.push(self.pos - self.last_offset, rule.token());
                    self.tokens.push(plen, self.context.rules.default_type());
                } else {
                    self.tokens.push(self.pos + plen - self.last_offset, rule.token());
                }
                self.last_offset = self.pos + plen;
                self.last_keyword = self.last_offset;
                self.pos += plen - 1;
            }
            true
        } else {
            false
        }
    }

    /// Opens a span at the current position: plain spans defer or consume
    /// their begin text per `EXCLUDE_MATCH`; delegate spans resolve their
    /// target and push a delegation level. An unresolvable target degrades
    /// to the begin sequence as default-type text (the registry logs it).
    fn open_span(&mut self, rule: &Arc<Rule>, plen: usize) {
        let action = rule.action();

        if !action.contains(Action::DELEGATE) {
            self.context.in_rule = Some(rule.clone());
            if action.contains(Action::EXCLUDE_MATCH) {
                self.tokens.push(plen, self.context.rules.default_type());
                self.last_offset = self.pos + plen;
            } else {
                self.last_offset = self.pos;
            }
            return;
        }

        let target = rule.delegate_target().unwrap_or_default();
        match self.registry.rule_set(target) {
            Some(delegate) => {
                if action.contains(Action::EXCLUDE_MATCH) {
                    self.tokens.push(plen, self.context.rules.default_type());
                } else {
                    self.tokens.push(plen, rule.token());
                }
                self.last_offset = self.pos + plen;

                self.context.in_rule = Some(rule.clone());
                let parent =
                    std::mem::replace(&mut self.context, LineContext::new(delegate.clone()));
                self.context = LineContext::delegated(delegate, parent);
            }
            None => {
                self.tokens.push(plen, self.context.rules.default_type());
                self.last_offset = self.pos + plen;
            }
        }
    }

    /// Classifies the run `[start, end)` no rule claimed: an all-digit run
    /// (when the set highlights digits), else a keyword-map hit, else
    /// nothing, in which case the run stays part of the surrounding default
    /// text.
    fn mark_keyword(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end);
        let len = end - start;
        if len == 0 {
            return;
        }
        let run = &self.line[start..end];

        if self.context.rules.highlight_digits() && is_digit_run(run) {
            if start != self.last_offset {
                self.tokens.push(start - self.last_offset, self.context.rules.default_type());
            }
            self.tokens.push(len, TokenType::Digit);
            self.last_keyword = end;
            self.last_offset = end;
            return;
        }

        if let Some(keywords) = self.context.rules.keywords() {
            let token = keywords.lookup(run);
            if token != TokenType::Null {
                if start != self.last_offset {
                    self.tokens.push(start - self.last_offset, self.context.rules.default_type());
                }
                self.tokens.push(len, token);
                self.last_keyword = end;
                self.last_offset = end;
            }
        }
    }

    /// Literal pattern comparison at the cursor. Empty patterns never
    /// match; case-insensitive sets fold both sides.
    fn matches_here(&self, pattern: &[char], ignore_case: bool) -> bool {
        if pattern.is_empty() || self.line.len() - self.pos < pattern.len() {
            return false;
        }
        pattern.iter().zip(&self.line[self.pos..]).all(|(&a, &b)| {
            a == b || (ignore_case && (fold(a) == b || a == fold(b)))
        })
    }
}

fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Numeric-literal automaton: a leading `0` admits octal and, at the second
/// position, an `0x`/`0X` switch to hex; `e`/`E` exponents and `f`/`F`,
/// `l`/`L` suffixes require a digit before them; `.` and `-` are tolerated
/// anywhere so decimal points and signs don't break the run.
fn is_digit_run(run: &[char]) -> bool {
    let mut octal = false;
    let mut hex = false;
    let mut seen_digit = false;

    for (i, &ch) in run.iter().enumerate() {
        match ch {
            '0' => {
                if i == 0 {
                    octal = true;
                }
                seen_digit = true;
            }
            '1'..='9' => seen_digit = true,
            'x' | 'X' => {
                if octal && i == 1 {
                    hex = true;
                } else {
                    return false;
                }
            }
            'd' | 'D' => {
                if !hex {
                    return false;
                }
            }
            'f' | 'F' => {
                if !hex && !seen_digit {
                    return false;
                }
            }
            'l' | 'L' | 'e' | 'E' => {
                if !seen_digit {
                    return false;
                }
            }
            'a'..='c' | 'A'..='C' => {
                if !hex {
                    return false;
                }
            }
            '.' | '-' => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn digit_automaton() {
        assert!(is_digit_run(&run("0x1F")));
        assert!(is_digit_run(&run("3.14")));
        assert!(is_digit_run(&run("10L")));
        assert!(is_digit_run(&run("1e10")));
        assert!(is_digit_run(&run("0755")));
        assert!(is_digit_run(&run("2.5f")));

        assert!(!is_digit_run(&run("3x")));
        assert!(!is_digit_run(&run("x1F")));
        assert!(!is_digit_run(&run("e10")));
        assert!(!is_digit_run(&run("10Q")));
        assert!(!is_digit_run(&run("abc")));
    }
}
