//! Atomic edit batches.
//!
//! Every edit in a batch is expressed in the coordinates of the document as it
//! was *before* the batch. `Buffer::apply` validates the whole batch first and
//! then applies edits in reverse document order, so no edit shifts the
//! coordinates of another. Positions captured before the batch (cursor
//! targets) are translated with `EditBatch::map_position`.

use crate::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert `text` (no line breaks) at a character position.
    Insert { at: Position, text: String },
    /// Remove a whole line including its terminator.
    DeleteLine { line: usize },
}

impl Edit {
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::Insert {
            at,
            text: text.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Insert { at, .. } => at.line,
            Self::DeleteLine { line } => *line,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("buffer is read-only")]
    ReadOnly,
    #[error("line {line} out of range (line count {line_count})")]
    LineOutOfRange { line: usize, line_count: usize },
    #[error("offset {offset} out of range on line {line} (length {len})")]
    OffsetOutOfRange {
        line: usize,
        offset: usize,
        len: usize,
    },
    #[error("line {line} is both edited and deleted in one batch")]
    Conflict { line: usize },
}

/// Ordered collection of edits applied as one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    edits: Vec<Edit>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edit; an identical edit already in the batch is not added twice.
    pub fn push(&mut self, edit: Edit) {
        if !self.edits.contains(&edit) {
            self.edits.push(edit);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    pub fn deletes_line(&self, line: usize) -> bool {
        self.edits
            .iter()
            .any(|e| matches!(e, Edit::DeleteLine { line: l } if *l == line))
    }

    /// Edits sorted for application: last line first, and within a line the
    /// highest offset first.
    pub(crate) fn application_order(&self) -> Vec<&Edit> {
        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        ordered.sort_by(|a, b| {
            let key = |e: &Edit| match e {
                Edit::Insert { at, .. } => (e.line(), 0u8, at.offset),
                Edit::DeleteLine { .. } => (e.line(), 1u8, 0),
            };
            key(b).cmp(&key(a))
        });
        ordered
    }

    /// Translate a pre-batch position into post-batch coordinates.
    ///
    /// Lines removed above `pos` shift it up. A position on a removed line
    /// collapses to the start of the line that takes its place. Inserts on the
    /// same line at or before `pos.offset` push it right by their length.
    pub fn map_position(&self, pos: Position) -> Position {
        let removed_above = self
            .edits
            .iter()
            .filter(|e| matches!(e, Edit::DeleteLine { line } if *line < pos.line))
            .count();
        let line = pos.line - removed_above;
        if self.deletes_line(pos.line) {
            return Position::new(line, 0);
        }
        let shift: usize = self
            .edits
            .iter()
            .filter_map(|e| match e {
                Edit::Insert { at, text } if at.line == pos.line && at.offset <= pos.offset => {
                    Some(text.chars().count())
                }
                _ => None,
            })
            .sum();
        Position::new(line, pos.offset + shift)
    }
}

impl FromIterator<Edit> for EditBatch {
    fn from_iter<T: IntoIterator<Item = Edit>>(iter: T) -> Self {
        let mut batch = Self::new();
        for edit in iter {
            batch.push(edit);
        }
        batch
    }
}
