//! Status bar text.

use core_config::Settings;

pub const STATUS_LABEL: &str = "SmartSemicolon";
const AUTO_NEWLINE_MARK: &str = " ↓";

/// Text for the status item, or `None` when it should be hidden: the feature
/// is disabled or the active language has no rule.
pub fn status_text(settings: &Settings, has_rule: bool) -> Option<String> {
    if !settings.enable || !has_rule {
        return None;
    }
    let mut text = String::from(STATUS_LABEL);
    if settings.auto_newline {
        text.push_str(AUTO_NEWLINE_MARK);
    }
    Some(text)
}
