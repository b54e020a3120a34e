//! Rope-based host document used to exercise the terminator engine.
//!
//! The engine itself never mutates text. This crate provides the host side of
//! that boundary: a buffer that can be read line by line (`LineSource`), edited
//! through atomic `EditBatch` transactions, and asked to open an indented line
//! below a given line. All offsets are character offsets within a line.

use anyhow::Result;
use ropey::Rope;
use std::borrow::Cow;
use tracing::trace;

pub mod edit;
pub mod lines;

pub use edit::{Edit, EditBatch, EditError};
pub use lines::{LineSource, is_blank_text, leading_whitespace, strip_terminator};

/// A position inside a buffer expressed as (line index, character offset within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub offset: usize,
}

impl Position {
    pub const fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }

    pub const fn origin() -> Self {
        Self { line: 0, offset: 0 }
    }

    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.offset = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.offset > max_len {
            self.offset = max_len;
        }
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Debug, Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
    read_only: bool,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
            read_only: false,
        })
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Whole document as a string.
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn line_content_string(&self, idx: usize) -> String {
        let raw = self.rope.line(idx).to_string();
        strip_terminator(&raw).to_string()
    }

    fn char_index(&self, pos: Position) -> usize {
        self.rope.line_to_char(pos.line) + pos.offset
    }

    fn check_writable(&self) -> Result<(), EditError> {
        if self.read_only {
            Err(EditError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn check_line(&self, line: usize) -> Result<(), EditError> {
        let line_count = self.line_count();
        if line < line_count {
            Ok(())
        } else {
            Err(EditError::LineOutOfRange { line, line_count })
        }
    }

    fn check_position(&self, pos: Position) -> Result<(), EditError> {
        self.check_line(pos.line)?;
        let len = LineSource::line_len(self, pos.line);
        if pos.offset > len {
            return Err(EditError::OffsetOutOfRange {
                line: pos.line,
                offset: pos.offset,
                len,
            });
        }
        Ok(())
    }

    /// Insert `text` at `pos`; advances `pos` past the inserted characters.
    pub fn insert_text(&mut self, pos: &mut Position, text: &str) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_position(*pos)?;
        self.rope.insert(self.char_index(*pos), text);
        pos.offset += text.chars().count();
        Ok(())
    }

    /// Remove line `idx` with its terminator. Removing the only line leaves an empty buffer.
    pub fn delete_line(&mut self, idx: usize) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_line(idx)?;
        self.remove_line_unchecked(idx);
        Ok(())
    }

    fn remove_line_unchecked(&mut self, idx: usize) {
        let start = self.rope.line_to_char(idx);
        if idx + 1 < self.line_count() {
            let end = self.rope.line_to_char(idx + 1);
            self.rope.remove(start..end);
            return;
        }
        // Last line: take the terminator of the line above with it.
        let mut from = start;
        if from > 0 && self.rope.char(from - 1) == '\n' {
            from -= 1;
            if from > 0 && self.rope.char(from - 1) == '\r' {
                from -= 1;
            }
        } else if from > 0 && self.rope.char(from - 1) == '\r' {
            from -= 1;
        }
        self.rope.remove(from..self.rope.len_chars());
    }

    /// Open a new line below `line` carrying the same leading whitespace.
    /// Returns the cursor position at the end of the inherited indentation.
    pub fn open_line_below(&mut self, line: usize) -> Result<Position, EditError> {
        self.check_writable()?;
        self.check_line(line)?;
        let raw = self.rope.line(line).to_string();
        let eol = if raw.ends_with("\r\n") {
            "\r\n"
        } else if raw.ends_with('\r') {
            "\r"
        } else {
            "\n"
        };
        let content = strip_terminator(&raw);
        let indent = leading_whitespace(content).to_string();
        let at = self.rope.line_to_char(line) + content.chars().count();
        self.rope.insert(at, &format!("{eol}{indent}"));
        let cursor = Position::new(line + 1, indent.chars().count());
        trace!(target: "text.buffer", line, indent = cursor.offset, "open_line_below");
        Ok(cursor)
    }

    /// Apply a batch atomically: either every edit lands or none does.
    pub fn apply(&mut self, batch: &EditBatch) -> Result<(), EditError> {
        self.check_writable()?;
        for edit in batch.iter() {
            match edit {
                Edit::Insert { at, .. } => {
                    self.check_position(*at)?;
                    if batch.deletes_line(at.line) {
                        return Err(EditError::Conflict { line: at.line });
                    }
                }
                Edit::DeleteLine { line } => self.check_line(*line)?,
            }
        }
        for edit in batch.application_order() {
            match edit {
                Edit::Insert { at, text } => {
                    self.rope.insert(self.char_index(*at), text);
                }
                Edit::DeleteLine { line } => self.remove_line_unchecked(*line),
            }
        }
        trace!(target: "text.buffer", edits = batch.len(), lines = self.line_count(), "batch_applied");
        Ok(())
    }
}

impl LineSource for Buffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_text(&self, idx: usize) -> Option<Cow<'_, str>> {
        if idx < self.rope.len_lines() {
            Some(Cow::Owned(self.line_content_string(idx)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).unwrap(), "hello\n");
        assert_eq!(b.line(1).unwrap(), "world");
        assert_eq!(b.line_text(0).unwrap(), "hello");
    }

    #[test]
    fn insert_text_uses_char_offsets() {
        let mut b = Buffer::from_str("t", "é = f()").unwrap();
        let mut pos = Position::new(0, 7);
        b.insert_text(&mut pos, ";").unwrap();
        assert_eq!(b.contents(), "é = f();");
        assert_eq!(pos, Position::new(0, 8));
    }

    #[test]
    fn insert_text_rejects_offset_past_line_end() {
        let mut b = Buffer::from_str("t", "ab\ncd").unwrap();
        let mut pos = Position::new(0, 3);
        let err = b.insert_text(&mut pos, ";").unwrap_err();
        assert_eq!(
            err,
            EditError::OffsetOutOfRange {
                line: 0,
                offset: 3,
                len: 2
            }
        );
    }

    #[test]
    fn delete_interior_line() {
        let mut b = Buffer::from_str("t", "a\n  \nb").unwrap();
        b.delete_line(1).unwrap();
        assert_eq!(b.contents(), "a\nb");
    }

    #[test]
    fn delete_last_line_takes_previous_terminator() {
        let mut b = Buffer::from_str("t", "a\r\nb").unwrap();
        b.delete_line(1).unwrap();
        assert_eq!(b.contents(), "a");
    }

    #[test]
    fn only_cr_and_lf_break_lines() {
        let b = Buffer::from_str("t", "int a = 1\n\x0c\nint b = 2").unwrap();
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.line_text(1).unwrap(), "\x0c");
        assert_eq!(b.line_text(2).unwrap(), "int b = 2");

        let b = Buffer::from_str("t", "a = 1\u{2028}b = 2\u{85}c\x0bd").unwrap();
        assert_eq!(b.line_count(), 1);

        let b = Buffer::from_str("t", "a\rb").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_text(0).unwrap(), "a");
    }

    #[test]
    fn delete_last_line_after_lone_cr() {
        let mut b = Buffer::from_str("t", "a\rb").unwrap();
        b.delete_line(1).unwrap();
        assert_eq!(b.contents(), "a");
    }

    #[test]
    fn delete_only_line_empties_buffer() {
        let mut b = Buffer::from_str("t", "   ").unwrap();
        b.delete_line(0).unwrap();
        assert_eq!(b.contents(), "");
        assert_eq!(b.line_count(), 1);
    }

    #[test]
    fn open_line_below_inherits_indentation() {
        let mut b = Buffer::from_str("t", "{\n\tfoo();\n}").unwrap();
        let cursor = b.open_line_below(1).unwrap();
        assert_eq!(cursor, Position::new(2, 1));
        assert_eq!(b.contents(), "{\n\tfoo();\n\t\n}");
    }

    #[test]
    fn read_only_buffer_rejects_every_mutation() {
        let mut b = Buffer::from_str("t", "x").unwrap();
        b.set_read_only(true);
        let mut pos = Position::origin();
        assert_eq!(b.insert_text(&mut pos, ";"), Err(EditError::ReadOnly));
        assert_eq!(b.delete_line(0), Err(EditError::ReadOnly));
        assert_eq!(b.open_line_below(0), Err(EditError::ReadOnly));
        assert_eq!(b.apply(&EditBatch::new()), Err(EditError::ReadOnly));
        assert_eq!(b.contents(), "x");
    }

    #[test]
    fn apply_batch_uses_pre_edit_coordinates() {
        let mut b = Buffer::from_str("t", "a = 1\n\nb = 2 // two\nc = f(x) }").unwrap();
        let batch: EditBatch = [
            Edit::insert(Position::new(0, 5), ";"),
            Edit::DeleteLine { line: 1 },
            Edit::insert(Position::new(2, 5), ";"),
            Edit::insert(Position::new(3, 8), ";"),
        ]
        .into_iter()
        .collect();
        b.apply(&batch).unwrap();
        assert_eq!(b.contents(), "a = 1;\nb = 2; // two\nc = f(x); }");
    }

    #[test]
    fn apply_batch_is_all_or_nothing() {
        let mut b = Buffer::from_str("t", "a\nb").unwrap();
        let batch: EditBatch = [
            Edit::insert(Position::new(0, 1), ";"),
            Edit::insert(Position::new(1, 9), ";"),
        ]
        .into_iter()
        .collect();
        assert!(b.apply(&batch).is_err());
        assert_eq!(b.contents(), "a\nb");
    }

    #[test]
    fn apply_batch_rejects_insert_into_deleted_line() {
        let mut b = Buffer::from_str("t", "a\n\nb").unwrap();
        let batch: EditBatch = [
            Edit::insert(Position::new(1, 0), ";"),
            Edit::DeleteLine { line: 1 },
        ]
        .into_iter()
        .collect();
        assert_eq!(b.apply(&batch), Err(EditError::Conflict { line: 1 }));
    }

    #[test]
    fn position_clamp() {
        let b = Buffer::from_str("t", "abc\nd").unwrap();
        let mut pos = Position::new(7, 9);
        pos.clamp_to(b.line_count(), |l| LineSource::line_len(&b, l));
        assert_eq!(pos, Position::new(1, 1));
    }
}
