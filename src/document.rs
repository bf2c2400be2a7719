// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Character access boundary to the (external) document storage.

use thiserror::Error;

/// A line could not be read, e.g. it was removed between the edit
/// notification and the scan. Recoverable: the tokenizer logs it and treats
/// the line as empty.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("line {0} does not exist")]
    OutOfBounds(usize),
    #[error("line {0} is unavailable: {1}")]
    Unavailable(usize, String),
}

/// Read access to line text. Implemented by the embedding document layer;
/// must reflect the document's state at call time.
pub trait Document {
    /// Appends the text of `line` (without its newline) to `out`. `out` is
    /// cleared by the caller beforehand.
    fn read_line(&self, line: usize, out: &mut String) -> Result<(), ReadError>;
}

fn read_from_slice<S: AsRef<str>>(
    lines: &[S],
    line: usize,
    out: &mut String,
) -> Result<(), ReadError> {
    let text = lines.get(line).ok_or(ReadError::OutOfBounds(line))?;
    out.push_str(text.as_ref());
    Ok(())
}

/// Any array or vector of string-likes is a document, one element per line.
impl<S: AsRef<str>, const N: usize> Document for [S; N] {
    fn read_line(&self, line: usize, out: &mut String) -> Result<(), ReadError> {
        read_from_slice(self, line, out)
    }
}

impl<S: AsRef<str>> Document for Vec<S> {
    fn read_line(&self, line: usize, out: &mut String) -> Result<(), ReadError> {
        read_from_slice(self, line, out)
    }
}
