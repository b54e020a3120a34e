//! Line analysis engine for statement terminators.
//!
//! Pure and deterministic: every function depends only on the line text (plus
//! one line of lookahead/lookbehind for newline decisions), a cursor offset and
//! an optional `LanguageRule`. Nothing here mutates text; hosts apply the
//! decisions. Logging happens at TRACE under the `analysis` target and never
//! includes line content.

pub mod empty_line;
pub mod newline;
pub mod terminator;
pub mod tokens;

pub use empty_line::{EmptyLinePlan, plan_empty_line};
pub use newline::{NewlineRule, can_open_line_below};
pub use terminator::{InsertionDecision, LineQuery, Placement, SkipReason, terminator_position};
pub use tokens::{Token, contains_keyword, find_keyword, tokens};
