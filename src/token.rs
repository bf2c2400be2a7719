// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! The token model: a closed set of token types and the per-line sequence.
//!
//! A line's tokens cover its characters exactly: the lengths of all spans sum
//! to the line's character count, and the sequence ends with a zero-length
//! [`TokenType::End`] sentinel. Adjacent spans of the same type are merged as
//! they are produced, so consumers never see two mergeable neighbors.

use std::fmt::Debug;

/// The kind of a token. The (external) renderer maps each kind to a style;
/// this crate only classifies text.
///
/// This is a closed set; grammars cannot extend it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Plain text, rendered with the default style.
    Null,
    Comment1,
    Comment2,
    Literal1,
    Literal2,
    Label,
    Keyword1,
    Keyword2,
    Keyword3,
    Function,
    Markup,
    Operator,
    Digit,
    /// Text that could not be tokenized correctly, e.g. the tail of a string
    /// literal that may not cross lines but reached the end of one.
    Invalid,
    /// Zero-length sentinel terminating every line's token sequence.
    End,
}

impl TokenType {
    /// Parses the uppercase name used in grammar definitions. `End` is
    /// internal and has no name.
    pub fn from_name(name: &str) -> Option<TokenType> {
        Some(match name {
            "NULL" => TokenType::Null,
            "COMMENT1" => TokenType::Comment1,
            "COMMENT2" => TokenType::Comment2,
            "LITERAL1" => TokenType::Literal1,
            "LITERAL2" => TokenType::Literal2,
            "LABEL" => TokenType::Label,
            "KEYWORD1" => TokenType::Keyword1,
            "KEYWORD2" => TokenType::Keyword2,
            "KEYWORD3" => TokenType::Keyword3,
            "FUNCTION" => TokenType::Function,
            "MARKUP" => TokenType::Markup,
            "OPERATOR" => TokenType::Operator,
            "DIGIT" => TokenType::Digit,
            "INVALID" => TokenType::Invalid,
            _ => return None,
        })
    }
}

/// One span of a line. `len` is a character count, not a byte count.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub len: usize,
    pub ty: TokenType,
}

impl Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {:?})", self.len, self.ty)
    }
}

/// The token sequence of one line.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    spans: Vec<Token>,
}

impl Tokens {
    pub(crate) fn clear(&mut self) {
        self.spans.clear();
    }

    /// Appends a span, merging it into the previous one if the types match.
    /// Zero-length spans are dropped.
    pub(crate) fn push(&mut self, len: usize, ty: TokenType) {
        assert!(ty != TokenType::End, "the End sentinel is appended by finish()");
        if len == 0 {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.ty == ty
        {
            last.len += len;
            return;
        }
        self.spans.push(Token { len, ty });
    }

    /// Terminates the sequence with the zero-length `End` sentinel.
    pub(crate) fn finish(&mut self) {
        self.spans.push(Token { len: 0, ty: TokenType::End });
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.spans
    }

    /// Character count covered by the sequence (the sentinel adds nothing).
    pub fn text_len(&self) -> usize {
        self.spans.iter().map(|t| t.len).sum()
    }
}
