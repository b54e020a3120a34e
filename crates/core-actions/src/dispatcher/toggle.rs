//! Enable / auto-newline toggles. Both flip one flag and report the new value;
//! persisting it is the host's business.

use core_config::Settings;
use tracing::info;

pub fn toggle_enable(settings: &mut Settings) -> bool {
    settings.enable = !settings.enable;
    info!(target: "actions", enable = settings.enable, "toggle_enable");
    settings.enable
}

pub fn toggle_auto_newline(settings: &mut Settings) -> bool {
    settings.auto_newline = !settings.auto_newline;
    info!(target: "actions", auto_newline = settings.auto_newline, "toggle_auto_newline");
    settings.auto_newline
}
