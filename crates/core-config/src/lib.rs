//! Configuration loading and parsing.
//!
//! Parses `smartsemi.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [insert]
//! enable = true
//! auto_newline = true
//! delete_empty_line = true
//! fallback = "cursor"                 # or "line-end"
//! already_terminated = "keep-newline" # or "suppress-all"
//!
//! [newline]
//! rule = "simple"                     # or "adjacent"
//!
//! [[languages]]
//! ids = ["kotlin", "swift"]
//! comment = "//"
//! brackets = ["{", "}"]
//! exception_keywords = ["for"]
//! newline_exception_keywords = ["return"]
//! ```
//!
//! A missing file yields defaults. A file that fails to parse also yields
//! defaults (logged at WARN) so a typo never disables the editor. Unknown
//! fields are ignored. Nothing here is cached globally: callers take a
//! `Settings` value from `Config::settings` and pass it into each request,
//! reloading whenever the file changes.

use anyhow::{Context, Result};
use core_analysis::NewlineRule;
use core_rules::{LanguageOverride, RuleTable};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "smartsemi.toml";

/// What to do when there is no rule for the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fallback {
    /// Insert the terminator literally at the cursor.
    #[default]
    Cursor,
    /// Insert it at the end of the line (trailing blanks stepped over).
    LineEnd,
}

/// What to do when the terminator is already right before the computed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminatedPolicy {
    /// Do not insert a duplicate, move past it and still run the newline step.
    #[default]
    KeepNewline,
    /// Do not insert and do not open a new line; the cursor only moves.
    SuppressAll,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct InsertConfig {
    #[serde(default = "InsertConfig::default_true")]
    pub enable: bool,
    #[serde(default = "InsertConfig::default_true")]
    pub auto_newline: bool,
    #[serde(default = "InsertConfig::default_true")]
    pub delete_empty_line: bool,
    #[serde(default)]
    pub fallback: Fallback,
    #[serde(default)]
    pub already_terminated: TerminatedPolicy,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            enable: true,
            auto_newline: true,
            delete_empty_line: true,
            fallback: Fallback::default(),
            already_terminated: TerminatedPolicy::default(),
        }
    }
}

impl InsertConfig {
    const fn default_true() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct NewlineConfig {
    #[serde(default)]
    pub rule: NewlineRule,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub insert: InsertConfig,
    #[serde(default)]
    pub newline: NewlineConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageOverride>,
}

/// Flat, copyable view of the settings a single insert request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub enable: bool,
    pub auto_newline: bool,
    pub delete_empty_line: bool,
    pub fallback: Fallback,
    pub already_terminated: TerminatedPolicy,
    pub newline_rule: NewlineRule,
}

impl Default for Settings {
    fn default() -> Self {
        ConfigFile::default().settings()
    }
}

impl ConfigFile {
    pub fn settings(&self) -> Settings {
        Settings {
            enable: self.insert.enable,
            auto_newline: self.insert.auto_newline,
            delete_empty_line: self.insert.delete_empty_line,
            fallback: self.insert.fallback,
            already_terminated: self.insert.already_terminated,
            newline_rule: self.newline.rule,
        }
    }

    /// Write a `Settings` value back into the file model (used by toggles).
    pub fn store_settings(&mut self, settings: Settings) {
        self.insert.enable = settings.enable;
        self.insert.auto_newline = settings.auto_newline;
        self.insert.delete_empty_line = settings.delete_empty_line;
        self.insert.fallback = settings.fallback;
        self.insert.already_terminated = settings.already_terminated;
        self.newline.rule = settings.newline_rule;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("smartsemi").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), languages = file.languages.len(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn settings(&self) -> Settings {
        self.file.settings()
    }

    /// Built-in rules with this file's `[[languages]]` entries applied.
    pub fn rule_table(&self) -> Result<RuleTable> {
        RuleTable::builtin()
            .with_overrides(&self.file.languages)
            .context("invalid [[languages]] entry in settings")
    }

    /// Serialize the current file model to `path`, creating parent directories.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&self.file).context("serializing settings")?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, &content).with_context(|| format!("writing {}", path.display()))?;
        info!(target: "config", path = %path.display(), "config_saved");
        self.raw = Some(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl Write for LockedWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        let s = cfg.settings();
        assert!(s.enable && s.auto_newline && s.delete_empty_line);
        assert_eq!(s.fallback, Fallback::Cursor);
        assert_eq!(s.already_terminated, TerminatedPolicy::KeepNewline);
        assert_eq!(s.newline_rule, NewlineRule::Simple);
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn parses_insert_and_newline_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[insert]\nauto_newline = false\nfallback = \"line-end\"\nalready_terminated = \"suppress-all\"\n[newline]\nrule = \"adjacent\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let s = cfg.settings();
        assert!(s.enable);
        assert!(!s.auto_newline);
        assert!(s.delete_empty_line);
        assert_eq!(s.fallback, Fallback::LineEnd);
        assert_eq!(s.already_terminated, TerminatedPolicy::SuppressAll);
        assert_eq!(s.newline_rule, NewlineRule::Adjacent);
    }

    #[test]
    fn language_overrides_feed_rule_table() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[[languages]]\nids = [\"kotlin\", \"swift\"]\ncomment = \"//\"\nbrackets = [\"{\", \"}\"]\nexception_keywords = [\"for\", \"while\"]\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let table = cfg.rule_table().unwrap();
        let kotlin = table.lookup("kotlin").unwrap();
        assert!(kotlin.exception_keywords.contains("while"));
        assert!(kotlin.newline_exception_keywords.is_empty());
        assert!(table.lookup("c").is_some());
    }

    #[test]
    fn invalid_language_override_is_an_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[[languages]]\nids = [\"x\"]\nbrackets = [\"|\", \"|\"]\n")
            .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let err = cfg.rule_table().unwrap_err();
        assert!(format!("{err:#}").contains("identical"));
    }

    #[test]
    fn save_round_trips_toggled_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut cfg = Config::default();
        let mut settings = cfg.settings();
        settings.enable = false;
        settings.newline_rule = NewlineRule::Adjacent;
        cfg.file.store_settings(settings);
        cfg.save_to(&path).unwrap();
        let reloaded = load_from(Some(path)).unwrap();
        assert_eq!(reloaded.settings(), settings);
        assert!(reloaded.raw.unwrap().contains("enable = false"));
    }

    #[test]
    fn parse_failure_logs_warning_and_uses_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[insert\nenable = nope\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())).unwrap());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed"));
        assert_eq!(cfg.settings(), Settings::default());
    }
}
