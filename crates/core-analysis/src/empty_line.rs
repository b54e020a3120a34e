//! Terminator requested on a blank line: remove the line instead.

use core_text::{LineSource, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyLinePlan {
    /// Nothing to delete: the line is not blank, or it is the document's only line.
    Keep,
    /// Delete `line`. `anchor` is where the cursor ends up, in pre-deletion
    /// coordinates: end of the line above, or start of the line below when
    /// `line` is the first line.
    Delete { line: usize, anchor: Position },
}

impl EmptyLinePlan {
    /// Cursor position after this single deletion has been applied.
    pub fn cursor_after(&self) -> Option<Position> {
        match self {
            Self::Keep => None,
            Self::Delete { line, anchor } if anchor.line > *line => {
                Some(Position::new(anchor.line - 1, anchor.offset))
            }
            Self::Delete { anchor, .. } => Some(*anchor),
        }
    }
}

pub fn plan_empty_line<D>(doc: &D, line: usize) -> EmptyLinePlan
where
    D: LineSource + ?Sized,
{
    if line >= doc.line_count() || !doc.is_blank(line) || doc.line_count() == 1 {
        return EmptyLinePlan::Keep;
    }
    let anchor = match line.checked_sub(1) {
        Some(above) => Position::new(above, doc.line_len(above)),
        None => Position::new(1, 0),
    };
    EmptyLinePlan::Delete { line, anchor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_line_is_kept() {
        assert_eq!(plan_empty_line(&["   "][..], 0), EmptyLinePlan::Keep);
    }

    #[test]
    fn non_blank_line_is_kept() {
        assert_eq!(plan_empty_line(&["a", "b"][..], 1), EmptyLinePlan::Keep);
    }

    #[test]
    fn first_line_moves_cursor_to_start_of_next() {
        let plan = plan_empty_line(&["", "int a;"][..], 0);
        assert_eq!(
            plan,
            EmptyLinePlan::Delete {
                line: 0,
                anchor: Position::new(1, 0)
            }
        );
        assert_eq!(plan.cursor_after(), Some(Position::new(0, 0)));
    }

    #[test]
    fn later_line_joins_cursor_to_end_of_line_above() {
        let plan = plan_empty_line(&["int a;", "\t", "}"][..], 1);
        assert_eq!(plan.cursor_after(), Some(Position::new(0, 6)));
    }
}
