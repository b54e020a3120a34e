//! Read-only line access shared by the analyzer and the host buffer.
//!
//! Contract:
//! - `line_text` never includes the line terminator (`\n`, `\r\n` or a lone `\r`).
//! - Offsets are character offsets (Unicode scalar values), never bytes.
//! - Out-of-range indices yield `None` / empty answers rather than panicking.

use std::borrow::Cow;

/// Abstraction over anything that can hand out document lines by index.
pub trait LineSource {
    /// Total number of lines. An empty document still has one (empty) line.
    fn line_count(&self) -> usize;

    /// Text of line `idx` without its terminator.
    fn line_text(&self, idx: usize) -> Option<Cow<'_, str>>;

    /// Character length of line `idx` (0 when out of range).
    fn line_len(&self, idx: usize) -> usize {
        self.line_text(idx).map_or(0, |t| t.chars().count())
    }

    /// True when the line is empty or whitespace only. Out-of-range lines count as blank.
    fn is_blank(&self, idx: usize) -> bool {
        self.line_text(idx).is_none_or(|t| is_blank_text(&t))
    }

    /// Character offset of the first non-whitespace character, if any.
    fn first_non_whitespace(&self, idx: usize) -> Option<usize> {
        self.line_text(idx)
            .and_then(|t| t.chars().position(|c| !c.is_whitespace()))
    }

    fn is_last_line(&self, idx: usize) -> bool {
        idx + 1 >= self.line_count()
    }
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line_count(&self) -> usize {
        self.len().max(1)
    }

    fn line_text(&self, idx: usize) -> Option<Cow<'_, str>> {
        if self.is_empty() && idx == 0 {
            return Some(Cow::Borrowed(""));
        }
        self.get(idx).map(|s| Cow::Borrowed(strip_terminator(s.as_ref())))
    }
}

impl<S: AsRef<str>> LineSource for Vec<S> {
    fn line_count(&self) -> usize {
        self.as_slice().line_count()
    }

    fn line_text(&self, idx: usize) -> Option<Cow<'_, str>> {
        self.as_slice().line_text(idx)
    }
}

/// Empty or whitespace-only text.
pub fn is_blank_text(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Leading run of spaces and tabs (the indentation a new line inherits).
pub fn leading_whitespace(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| *c != ' ' && *c != '\t')
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Strip a single trailing line terminator.
pub fn strip_terminator(line: &str) -> &str {
    if let Some(rest) = line.strip_suffix('\n') {
        rest.strip_suffix('\r').unwrap_or(rest)
    } else {
        line.strip_suffix('\r').unwrap_or(line)
    }
}
