//! Rule table: per-language comment, bracket and keyword configuration.
//!
//! - `LanguageRule` is a plain value; the table owns every rule and hands out
//!   shared read-only handles.
//! - Lookups of unknown ids return `None`; callers treat that as plain text.
//! - Settings files may add or replace rules (`LanguageOverride`); entries are
//!   validated before they enter the table.

pub mod detect;
pub mod rule;
pub mod table;

pub use detect::language_id_for_path;
pub use rule::{BracketPair, DEFAULT_TERMINATOR, LanguageRule, RuleError};
pub use table::{BRACE_LANGUAGES, LanguageOverride, RuleTable, brace_rule};
