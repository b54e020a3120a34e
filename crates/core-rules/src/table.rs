//! Language id → rule mapping.
//!
//! The table owns every rule. Several ids may point at the same `Arc`:
//! inserting a rule equal to one already present shares the existing value
//! instead of allocating a duplicate, so the built-in brace family is stored
//! once no matter how many ids alias it.

use crate::rule::{LanguageRule, RuleError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Ids sharing the built-in brace-language rule.
pub const BRACE_LANGUAGES: &[&str] = &[
    "c",
    "cpp",
    "csharp",
    "go",
    "java",
    "javascript",
    "javascriptreact",
    "shaderlab",
    "typescript",
    "typescriptreact",
];

/// A settings-file rule entry: the ids it applies to plus the rule itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOverride {
    pub ids: Vec<String>,
    #[serde(flatten)]
    pub rule: LanguageRule,
}

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Arc<LanguageRule>>,
}

/// The rule shared by C-like languages.
pub fn brace_rule() -> LanguageRule {
    LanguageRule::plain()
        .with_comment("//")
        .with_brackets("{", "}")
        .with_exception_keywords(["for"])
        .with_newline_exception_keywords(["return", "break", "continue", "throw"])
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table: the brace family.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        let shared = Arc::new(brace_rule());
        for id in BRACE_LANGUAGES {
            table.rules.insert((*id).to_string(), Arc::clone(&shared));
        }
        table
    }

    /// Bind every id in `ids` to `rule`, sharing an equal rule already in the table.
    pub fn insert<I, S>(&mut self, ids: I, rule: LanguageRule) -> Result<Arc<LanguageRule>, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        rule.validate()?;
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| id.as_ref().trim().to_string())
            .collect();
        if ids.iter().any(String::is_empty) {
            return Err(RuleError::EmptyLanguageId);
        }
        let shared = self
            .rules
            .values()
            .find(|existing| ***existing == rule)
            .cloned()
            .unwrap_or_else(|| Arc::new(rule));
        for id in ids {
            self.rules.insert(id, Arc::clone(&shared));
        }
        Ok(shared)
    }

    /// Apply settings-file entries on top of this table. Later entries win.
    pub fn with_overrides(mut self, overrides: &[LanguageOverride]) -> Result<Self, RuleError> {
        for entry in overrides {
            self.insert(&entry.ids, entry.rule.clone())?;
            debug!(target: "rules", ids = ?entry.ids, "language_override_applied");
        }
        Ok(self)
    }

    pub fn lookup(&self, language_id: &str) -> Option<&LanguageRule> {
        self.rules.get(language_id).map(AsRef::as_ref)
    }

    /// Shared handle to the rule for `language_id`.
    pub fn shared(&self, language_id: &str) -> Option<Arc<LanguageRule>> {
        self.rules.get(language_id).cloned()
    }

    pub fn contains(&self, language_id: &str) -> bool {
        self.rules.contains_key(language_id)
    }

    /// Sorted list of configured language ids.
    pub fn language_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of distinct rule values held (aliases counted once).
    pub fn distinct_rules(&self) -> usize {
        let mut seen: Vec<*const LanguageRule> = Vec::new();
        for rule in self.rules.values() {
            let ptr = Arc::as_ptr(rule);
            if !seen.contains(&ptr) {
                seen.push(ptr);
            }
        }
        seen.len()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
