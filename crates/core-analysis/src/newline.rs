//! May a new line be opened below the cursor after the terminator lands?
//!
//! Two variants exist. `Simple` permits whenever the next line is blank or
//! starts with a bracket. `Adjacent` additionally keeps a lone statement
//! between a block opener and its closer tight, and refuses whenever the
//! next line is further code.

use core_rules::{BracketPair, LanguageRule};
use core_text::LineSource;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::terminator::{comment_start, find_from};
use crate::tokens::find_keyword;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NewlineRule {
    /// Next line blank, or its first non-blank text is a bracket ⇒ permit.
    #[default]
    Simple,
    /// Refuse between an opener above and a closer below, and before code.
    Adjacent,
}

/// Code part of a line: everything before the comment marker.
fn code_part(text: &str, rule: &LanguageRule) -> String {
    let chars: Vec<char> = text.chars().collect();
    let end = comment_start(&chars, rule).unwrap_or(chars.len());
    chars[..end].iter().collect()
}

fn starts_with_bracket(text: &str, pair: &BracketPair) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with(pair.open.as_str()) || trimmed.starts_with(pair.close.as_str())
}

fn is_comment_line(text: &str, rule: &LanguageRule) -> bool {
    rule.comment_marker
        .as_deref()
        .is_some_and(|marker| text.trim_start().starts_with(marker))
}

/// The line leaves a block open: its last open bracket comes after its last close.
fn opens_block(text: &str, pair: &BracketPair) -> bool {
    match (text.rfind(pair.open.as_str()), text.rfind(pair.close.as_str())) {
        (Some(open), Some(close)) => close < open,
        (Some(_), None) => true,
        _ => false,
    }
}

/// The line closes a block before opening another one.
fn closes_block(text: &str, pair: &BracketPair) -> bool {
    let chars: Vec<char> = text.chars().collect();
    match (find_from(&chars, &pair.open, 0), find_from(&chars, &pair.close, 0)) {
        (Some(open), Some(close)) => close < open,
        (None, Some(_)) => true,
        _ => false,
    }
}

/// Decide whether a new line may be opened below `line` of `doc`.
///
/// `line` is the line holding the cursor after insertion. Without a rule the
/// answer is "last line, or the next line is blank".
pub fn can_open_line_below<D>(
    doc: &D,
    line: usize,
    rule: Option<&LanguageRule>,
    mode: NewlineRule,
) -> bool
where
    D: LineSource + ?Sized,
{
    let Some(text) = doc.line_text(line) else {
        return false;
    };
    let permitted = match rule {
        None => doc.is_last_line(line) || doc.is_blank(line + 1),
        Some(rule) => {
            if let Some(keyword) =
                find_keyword(&code_part(&text, rule), &rule.newline_exception_keywords)
            {
                trace!(target: "analysis", line, keyword = keyword.as_str(), "newline_exception_keyword");
                return false;
            }
            if doc.is_last_line(line) {
                return true;
            }
            let below = doc.line_text(line + 1).unwrap_or_default();
            match (&rule.brackets, mode) {
                (None, _) => doc.is_blank(line + 1),
                (Some(pair), NewlineRule::Simple) => {
                    doc.is_blank(line + 1) || starts_with_bracket(&below, pair)
                }
                (Some(pair), NewlineRule::Adjacent) => {
                    let above_open = line > 0
                        && doc
                            .line_text(line - 1)
                            .is_some_and(|above| opens_block(&code_part(&above, rule), pair));
                    let below_close = closes_block(&code_part(&below, rule), pair);
                    let below_code = !below_close
                        && !doc.is_blank(line + 1)
                        && !is_comment_line(&below, rule);
                    !((above_open && below_close) || below_code)
                }
            }
        }
    };
    trace!(target: "analysis", line, ?mode, permitted, "newline_permission");
    permitted
}
