//! Terminator placement for a single line.
//!
//! Given a line, a cursor offset and an optional rule, decide where the
//! statement terminator belongs:
//!
//! 1. A comment marker at or before the cursor skips the line.
//! 2. An exception keyword in the code part of the line skips it.
//! 3. The candidate end starts at the comment marker (or line end) and is
//!    pulled back to the first bracket found at or after the cursor.
//! 4. Trailing spaces and tabs before the candidate end are stepped over.
//!
//! Offsets are character offsets. The function is total: any cursor past the
//! end of the line is treated as the line end.

use core_rules::LanguageRule;
use serde::Serialize;
use tracing::trace;

use crate::tokens::find_keyword;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The cursor is inside (or right at the start of) a trailing comment.
    InsideComment,
    /// The line carries an exception keyword such as a `for` header.
    ExceptionKeyword,
}

/// Where the terminator goes on a line that accepts one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Character offset in `[0, line length]`.
    pub offset: usize,
    /// A close bracket bounds the statement on this line (after `offset`).
    pub preceded_by_close_bracket: bool,
    /// The character right before `offset` already is the terminator.
    pub already_terminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum InsertionDecision {
    Skip { reason: SkipReason },
    Insert(Placement),
}

impl InsertionDecision {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }

    pub fn placement(&self) -> Option<Placement> {
        match self {
            Self::Insert(placement) => Some(*placement),
            Self::Skip { .. } => None,
        }
    }

    pub fn offset(&self) -> Option<usize> {
        self.placement().map(|p| p.offset)
    }
}

/// One terminator request against one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineQuery<'a> {
    pub text: &'a str,
    pub line: usize,
    pub cursor: usize,
}

impl<'a> LineQuery<'a> {
    pub fn new(text: &'a str, line: usize, cursor: usize) -> Self {
        Self { text, line, cursor }
    }

    pub fn decide(&self, rule: Option<&LanguageRule>) -> InsertionDecision {
        let decision = terminator_position(self.text, self.cursor, rule);
        trace!(target: "analysis", line = self.line, cursor = self.cursor, ?decision, "terminator_decision");
        decision
    }
}

/// Character index of the first occurrence of `pattern` in `chars[from..]`.
pub(crate) fn find_from(chars: &[char], pattern: &str, from: usize) -> Option<usize> {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() || from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(pattern.len())
        .position(|w| w == pattern.as_slice())
        .map(|i| i + from)
}

/// Char offset of the comment marker's first occurrence, if the rule has one.
pub(crate) fn comment_start(chars: &[char], rule: &LanguageRule) -> Option<usize> {
    rule.comment_marker
        .as_deref()
        .and_then(|marker| find_from(chars, marker, 0))
}

/// One past the last non-blank (space/tab) character before `end`, or 0.
fn trim_trailing_blanks(chars: &[char], end: usize) -> usize {
    chars[..end]
        .iter()
        .rposition(|c| *c != ' ' && *c != '\t')
        .map_or(0, |i| i + 1)
}

/// Decide where the terminator belongs on `line` for a cursor at `cursor`.
/// `None` for `rule` disables every guard (plain text).
pub fn terminator_position(
    line: &str,
    cursor: usize,
    rule: Option<&LanguageRule>,
) -> InsertionDecision {
    let plain = LanguageRule::plain();
    let rule = rule.unwrap_or(&plain);
    let chars: Vec<char> = line.chars().collect();
    let cursor = cursor.min(chars.len());

    let comment = comment_start(&chars, rule);
    if comment.is_some_and(|at| at <= cursor) {
        return InsertionDecision::Skip {
            reason: SkipReason::InsideComment,
        };
    }
    let code_end = comment.unwrap_or(chars.len());
    let code: String = chars[..code_end].iter().collect();
    if let Some(keyword) = find_keyword(&code, &rule.exception_keywords) {
        trace!(target: "analysis", keyword = keyword.as_str(), "exception_keyword");
        return InsertionDecision::Skip {
            reason: SkipReason::ExceptionKeyword,
        };
    }

    let mut end = code_end;
    let mut preceded_by_close_bracket = false;
    if let Some(pair) = &rule.brackets {
        let scope = &chars[..end];
        let open = find_from(scope, &pair.open, cursor);
        let close = find_from(scope, &pair.close, cursor);
        match (open, close) {
            (Some(o), Some(c)) => {
                end = o.min(c);
                preceded_by_close_bracket = c <= o;
            }
            (Some(o), None) => end = o,
            (None, Some(c)) => {
                end = c;
                preceded_by_close_bracket = true;
            }
            (None, None) => {}
        }
    }

    let offset = trim_trailing_blanks(&chars, end);
    let already_terminated = offset > 0 && chars[offset - 1] == rule.terminator;
    InsertionDecision::Insert(Placement {
        offset,
        preceded_by_close_bracket,
        already_terminated,
    })
}
