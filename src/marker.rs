// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Per-document token cache and the incremental re-tokenization driver.
//!
//! One [`TokenMarker`] per document. Each line caches its last token
//! sequence and end-of-line context with a validity flag. A query for an
//! invalid line anchors at the nearest valid prior line within a bounded
//! lookback window (falling back to the document start) and re-scans
//! forward from there, caching every intermediate line. When a line's
//! outgoing context ends up different from what the following line last
//! assumed, the following lines are invalidated and
//! [`TokenMarker::is_next_line_requested`] tells the caller to repaint past
//! the directly-edited line.

use std::sync::Arc;

use crate::context::LineContext;
use crate::document::Document;
use crate::engine;
use crate::registry::Registry;
use crate::ruleset::RuleSet;
use crate::token::{Token, Tokens};

/// Default bound on the backward search for a valid anchor line.
pub const DEFAULT_LOOKBEHIND: usize = 100;

/// One cached line: tokens, end-of-line context, validity, display width.
pub struct LineInfo {
    tokens: Tokens,
    context: LineContext,
    valid: bool,
    width: usize,
}

impl LineInfo {
    fn new(main: Arc<RuleSet>) -> LineInfo {
        LineInfo {
            tokens: Tokens::default(),
            context: LineContext::new(main),
            valid: false,
            width: 0,
        }
    }

    /// The line's token sequence, ending with the `End` sentinel.
    pub fn tokens(&self) -> &[Token] {
        self.tokens.as_slice()
    }

    /// The context at the end of this line.
    pub fn context(&self) -> &LineContext {
        &self.context
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// Incremental tokenizer for one document.
pub struct TokenMarker {
    main: Arc<RuleSet>,
    lines: Vec<LineInfo>,
    lookbehind: usize,
    last_tokenized: Option<usize>,
    next_line_requested: bool,
    /// Scratch buffers reused across lines.
    text: String,
    chars: Vec<char>,
}

impl TokenMarker {
    /// A marker rooted at `main` (usually a grammar's `MAIN` set) with the
    /// default lookback window. The line count starts at zero; the document
    /// layer populates it through [`TokenMarker::insert_lines`].
    pub fn new(main: Arc<RuleSet>) -> TokenMarker {
        TokenMarker::with_lookbehind(main, DEFAULT_LOOKBEHIND)
    }

    /// `lookbehind` bounds how far back the anchor search goes before
    /// falling back to the document start.
    pub fn with_lookbehind(main: Arc<RuleSet>, lookbehind: usize) -> TokenMarker {
        TokenMarker {
            main,
            lines: Vec::new(),
            lookbehind,
            last_tokenized: None,
            next_line_requested: false,
            text: String::new(),
            chars: Vec::new(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines were inserted into the document; fresh invalid cache entries
    /// open up at `index`.
    pub fn insert_lines(&mut self, index: usize, count: usize) {
        let main = self.main.clone();
        self.lines.splice(index..index, (0..count).map(|_| LineInfo::new(main.clone())));
    }

    /// Lines were deleted from the document; the cache compacts.
    pub fn delete_lines(&mut self, index: usize, count: usize) {
        self.lines.drain(index..index + count);
    }

    /// A contiguous range of lines changed; their cached tokens are stale.
    pub fn lines_changed(&mut self, index: usize, count: usize) {
        let end = (index + count).min(self.lines.len());
        for info in &mut self.lines[index.min(end)..end] {
            info.valid = false;
        }
    }

    /// Returns valid tokens for `line`, recomputing as little as possible.
    ///
    /// O(1) when the cache is warm. Otherwise scans forward from the
    /// nearest valid anchor, marking each processed line valid. A line
    /// whose text cannot be read is logged and treated as empty rather
    /// than aborting the sweep.
    pub fn mark_tokens(
        &mut self,
        doc: &dyn Document,
        registry: &Registry,
        line: usize,
    ) -> &LineInfo {
        assert!(line < self.lines.len(), "line {line} out of cache range");

        if self.lines[line].valid {
            return &self.lines[line];
        }

        // Nearest valid anchor within the window; none means the scan
        // restarts at the top of the document.
        let window = line.saturating_sub(self.lookbehind);
        let mut start = 0;
        for i in (window..line).rev() {
            if self.lines[i].valid {
                start = i + 1;
                break;
            }
        }

        let mut prev: Option<LineContext> =
            (start > 0).then(|| self.lines[start - 1].context.clone());

        for i in start..=line {
            if self.lines[i].valid {
                prev = Some(self.lines[i].context.clone());
                continue;
            }

            self.text.clear();
            if let Err(err) = doc.read_line(i, &mut self.text) {
                log::error!("tokenizer skipping unreadable line: {err}");
                self.text.clear();
            }
            self.chars.clear();
            self.chars.extend(self.text.chars());

            let incoming = match &prev {
                Some(context) => context.clone(),
                None => LineContext::new(self.main.clone()),
            };

            let info = &mut self.lines[i];
            info.tokens.clear();
            let outgoing = engine::scan_line(&self.chars, incoming, registry, &mut info.tokens);
            info.tokens.finish();

            let changed = !outgoing.same_shape(&info.context);
            info.context = outgoing;
            info.valid = true;

            if self.last_tokenized != Some(i) {
                self.next_line_requested = false;
                self.last_tokenized = Some(i);
            }
            self.next_line_requested |= changed;

            prev = Some(info.context.clone());
        }

        if self.next_line_requested && self.lines.len() > line + 1 {
            self.lines_changed(line + 1, self.lines.len() - line - 1);
        }

        &self.lines[line]
    }

    /// True right after a [`TokenMarker::mark_tokens`] whose outgoing
    /// context differs from what the next line previously assumed; the
    /// caller should repaint beyond the current line.
    pub fn is_next_line_requested(&self) -> bool {
        self.next_line_requested
    }

    /// Stores a line's display width; returns true when it changed.
    pub fn set_line_width(&mut self, line: usize, width: usize) -> bool {
        let info = &mut self.lines[line];
        let changed = info.width != width;
        info.width = width;
        changed
    }

    /// The maximum stored display width over `count` lines from `start`.
    pub fn max_line_width(&self, start: usize, count: usize) -> usize {
        let end = (start + count).min(self.lines.len());
        self.lines[start.min(end)..end].iter().map(|info| info.width).max().unwrap_or(0)
    }
}
