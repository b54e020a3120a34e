use std::sync::Arc;

use core_config::Settings;
use core_rules::{LanguageRule, RuleTable};
use core_text::{Buffer, Position};

use crate::status::status_text;

/// Everything one editor pane needs to run commands: the buffer, its cursors,
/// the active language and the settings snapshot taken from config.
#[derive(Debug, Clone)]
pub struct Session {
    pub buffer: Buffer,
    pub cursors: Vec<Position>,
    pub language_id: Option<String>,
    pub rules: RuleTable,
    pub settings: Settings,
}

impl Session {
    pub fn new(buffer: Buffer, rules: RuleTable, settings: Settings) -> Self {
        Self {
            buffer,
            cursors: vec![Position::origin()],
            language_id: None,
            rules,
            settings,
        }
    }

    pub fn with_language(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }

    pub fn with_cursors(mut self, cursors: Vec<Position>) -> Self {
        self.cursors = cursors;
        self
    }

    /// Rule for the active language, if any.
    pub fn rule(&self) -> Option<Arc<LanguageRule>> {
        self.language_id
            .as_deref()
            .and_then(|id| self.rules.shared(id))
    }

    pub fn status_text(&self) -> Option<String> {
        let has_rule = self
            .language_id
            .as_deref()
            .is_some_and(|id| self.rules.contains(id));
        status_text(&self.settings, has_rule)
    }
}
