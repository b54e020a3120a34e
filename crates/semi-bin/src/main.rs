//! smartsemi entrypoint.
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use core_actions::{Command, Session, dispatch};
use core_analysis::LineQuery;
use core_config::{Config, discover, load_from};
use core_rules::{RuleTable, language_id_for_path};
use core_text::{Buffer, Position};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "smartsemi.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "smartsemi", version, about = "Smart statement terminator insertion")]
struct Args {
    /// Configuration file path (overrides discovery of `smartsemi.toml`).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the insertion decision for one line as JSON.
    Analyze {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        text: String,
        #[arg(long)]
        offset: usize,
    },
    /// Run the insert command on a file.
    Insert {
        file: PathBuf,
        /// Cursor as `line:offset` (0-based, character offset). Repeatable.
        #[arg(long = "cursor", value_parser = parse_cursor, required = true)]
        cursors: Vec<Position>,
        /// Language id; detected from the file extension when omitted.
        #[arg(long)]
        language: Option<String>,
        /// Write the result back instead of printing it.
        #[arg(long)]
        in_place: bool,
    },
    /// Flip a setting and persist it.
    Toggle { flag: ToggleFlag },
    /// Print the status item text for a language (nothing when hidden).
    Status {
        #[arg(long)]
        language: String,
    },
    /// List language ids with a rule.
    Languages,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ToggleFlag {
    Enable,
    AutoNewline,
}

fn parse_cursor(s: &str) -> Result<Position> {
    let (line, offset) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected line:offset, got `{s}`"))?;
    let line = line.trim().parse().context("cursor line")?;
    let offset = offset.trim().parse().context("cursor offset")?;
    Ok(Position::new(line, offset))
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; drop guard so the writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn analyze(config: &Config, language: Option<&str>, text: &str, offset: usize) -> Result<String> {
    let rules = config.rule_table()?;
    let rule = language.and_then(|id| rules.lookup(id));
    let decision = LineQuery::new(text, 0, offset).decide(rule);
    serde_json::to_string_pretty(&decision).context("serializing decision")
}

fn insert(
    config: &Config,
    file: &Path,
    cursors: Vec<Position>,
    language: Option<String>,
    in_place: bool,
) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let name = file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let buffer = Buffer::from_str(name, &content)?;
    let language = language.or_else(|| language_id_for_path(file).map(str::to_string));

    let mut session = Session::new(buffer, config.rule_table()?, config.settings())
        .with_cursors(cursors);
    if let Some(id) = language {
        session = session.with_language(id);
    }
    let result = dispatch(Command::Insert, &mut session)
        .with_context(|| format!("inserting terminator in {}", file.display()))?;

    if in_place && result.dirty {
        std::fs::write(file, session.buffer.contents())
            .with_context(|| format!("writing {}", file.display()))?;
    } else {
        print!("{}", session.buffer.contents());
    }
    for cursor in &session.cursors {
        eprintln!("cursor {}:{}", cursor.line, cursor.offset);
    }
    Ok(())
}

fn toggle(config: &mut Config, path: &Path, flag: ToggleFlag) -> Result<bool> {
    // Built-in rules only: a broken [[languages]] entry must not block toggling.
    let mut session = Session::new(
        Buffer::from_str("settings", "")?,
        RuleTable::builtin(),
        config.settings(),
    );
    let command = match flag {
        ToggleFlag::Enable => Command::Toggle,
        ToggleFlag::AutoNewline => Command::ToggleAutoNewline,
    };
    if dispatch(command, &mut session)?.settings_changed {
        config.file.store_settings(session.settings);
        config.save_to(path)?;
    }
    Ok(match flag {
        ToggleFlag::Enable => session.settings.enable,
        ToggleFlag::AutoNewline => session.settings.auto_newline,
    })
}

fn status(config: &Config, language: &str) -> Result<Option<String>> {
    let session = Session::new(
        Buffer::from_str("status", "")?,
        config.rule_table()?,
        config.settings(),
    )
    .with_language(language);
    Ok(session.status_text())
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(discover);
    let mut config = load_from(Some(config_path.clone()))?;
    match args.command {
        Cmd::Analyze {
            language,
            text,
            offset,
        } => println!("{}", analyze(&config, language.as_deref(), &text, offset)?),
        Cmd::Insert {
            file,
            cursors,
            language,
            in_place,
        } => insert(&config, &file, cursors, language, in_place)?,
        Cmd::Toggle { flag } => {
            let value = toggle(&mut config, &config_path, flag)?;
            println!("{flag:?} = {value}");
        }
        Cmd::Status { language } => {
            if let Some(text) = status(&config, &language)? {
                println!("{text}");
            }
        }
        Cmd::Languages => {
            for id in config.rule_table()?.language_ids() {
                println!("{id}");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    let args = Args::parse();
    info!(target: "runtime", command = ?args.command, "startup");
    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cursor_pairs() {
        assert_eq!(parse_cursor("3:7").unwrap(), Position::new(3, 7));
        assert_eq!(parse_cursor(" 0 : 0 ").unwrap(), Position::new(0, 0));
        assert!(parse_cursor("3").is_err());
        assert!(parse_cursor("a:1").is_err());
    }

    #[test]
    fn analyze_prints_tagged_json() {
        let json = analyze(&Config::default(), Some("c"), "for (;;) x", 10).unwrap();
        assert!(json.contains("\"decision\": \"skip\""));
        let json = analyze(&Config::default(), Some("c"), "x = 1  ", 0).unwrap();
        assert!(json.contains("\"offset\": 5"));
    }

    #[test]
    fn toggle_persists_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("smartsemi.toml");
        let mut config = load_from(Some(path.clone())).unwrap();
        assert!(!toggle(&mut config, &path, ToggleFlag::Enable).unwrap());
        let reloaded = load_from(Some(path)).unwrap();
        assert!(!reloaded.settings().enable);
        assert!(reloaded.settings().auto_newline);
    }

    #[test]
    fn status_follows_language_and_settings() {
        let config = Config::default();
        assert_eq!(
            status(&config, "typescript").unwrap().as_deref(),
            Some("SmartSemicolon ↓")
        );
        assert_eq!(status(&config, "python").unwrap(), None);
    }

    #[test]
    fn insert_in_place_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.c");
        std::fs::write(&file, "int a = 1  ").unwrap();
        insert(&Config::default(), &file, vec![Position::new(0, 2)], None, true).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "int a = 1;  \n");
    }
}
