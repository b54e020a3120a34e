//! Per-language rule record.
//!
//! A `LanguageRule` is an immutable value: once it is placed in a
//! `RuleTable` nobody mutates it. Every field is optional in the sense that an
//! empty value simply disables the guard it drives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Statement terminator used when a rule does not name one.
pub const DEFAULT_TERMINATOR: char = ';';

/// Block delimiters, written `["{", "}"]` in settings files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct BracketPair {
    pub open: String,
    pub close: String,
}

impl BracketPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl From<[String; 2]> for BracketPair {
    fn from([open, close]: [String; 2]) -> Self {
        Self { open, close }
    }
}

impl From<BracketPair> for [String; 2] {
    fn from(pair: BracketPair) -> Self {
        [pair.open, pair.close]
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("language id must not be empty")]
    EmptyLanguageId,
    #[error("comment marker must not be empty")]
    EmptyCommentMarker,
    #[error("bracket delimiters must not be empty")]
    EmptyBracket,
    #[error("open and close brackets are identical ({0:?})")]
    IdenticalBrackets(String),
    #[error("keyword {0:?} is empty or contains whitespace")]
    InvalidKeyword(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageRule {
    /// Sequence that starts a trailing line comment.
    #[serde(default, rename = "comment", skip_serializing_if = "Option::is_none")]
    pub comment_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brackets: Option<BracketPair>,
    /// Tokens that disqualify a line from terminator insertion (`for`).
    #[serde(default)]
    pub exception_keywords: BTreeSet<String>,
    /// Tokens that forbid opening a new line below (`return`, `break`).
    #[serde(default)]
    pub newline_exception_keywords: BTreeSet<String>,
    #[serde(default = "default_terminator")]
    pub terminator: char,
}

const fn default_terminator() -> char {
    DEFAULT_TERMINATOR
}

impl Default for LanguageRule {
    fn default() -> Self {
        Self {
            comment_marker: None,
            brackets: None,
            exception_keywords: BTreeSet::new(),
            newline_exception_keywords: BTreeSet::new(),
            terminator: DEFAULT_TERMINATOR,
        }
    }
}

impl LanguageRule {
    /// Rule with every guard disabled; what analysis uses for plain text.
    pub fn plain() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_comment(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = Some(marker.into());
        self
    }

    #[must_use]
    pub fn with_brackets(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.brackets = Some(BracketPair::new(open, close));
        self
    }

    #[must_use]
    pub fn with_exception_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exception_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_newline_exception_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.newline_exception_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_terminator(mut self, terminator: char) -> Self {
        self.terminator = terminator;
        self
    }

    /// Reject values that would make a guard misbehave silently.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.comment_marker.as_deref() == Some("") {
            return Err(RuleError::EmptyCommentMarker);
        }
        if let Some(pair) = &self.brackets {
            if pair.open.is_empty() || pair.close.is_empty() {
                return Err(RuleError::EmptyBracket);
            }
            if pair.open == pair.close {
                return Err(RuleError::IdenticalBrackets(pair.open.clone()));
            }
        }
        let keywords = self
            .exception_keywords
            .iter()
            .chain(&self.newline_exception_keywords);
        for keyword in keywords {
            if keyword.is_empty() || keyword.chars().any(char::is_whitespace) {
                return Err(RuleError::InvalidKeyword(keyword.clone()));
            }
        }
        Ok(())
    }
}
