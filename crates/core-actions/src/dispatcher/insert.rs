//! Terminator insertion across every cursor of a buffer.
//!
//! Two phases:
//! * `plan_insert` reads the pre-edit document and decides, per cursor, which
//!   edit to make and where that cursor should end up. Every cursor is
//!   analyzed against the original text of its own line.
//! * `insert_terminator` applies the resulting `EditBatch` as one transaction,
//!   maps the cursor targets through it, then (single cursor only) asks the
//!   analyzer whether a new line may be opened below.
//!
//! Multiple cursors on the same line are mapped best-effort only.

use anyhow::{Context, Result};
use core_analysis::{
    EmptyLinePlan, InsertionDecision, LineQuery, can_open_line_below, plan_empty_line,
};
use core_config::{Fallback, Settings, TerminatedPolicy};
use core_rules::{DEFAULT_TERMINATOR, LanguageRule};
use core_text::{Buffer, Edit, EditBatch, LineSource, Position};
use tracing::debug;

/// What happened at one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAction {
    /// Terminator typed literally at the cursor.
    Literal,
    /// Terminator placed at the analyzed offset.
    Placed { offset: usize },
    /// Terminator already present at the analyzed offset; nothing inserted.
    AlreadyTerminated { offset: usize },
    /// Blank line removed.
    DeletedLine,
    /// Nothing to do (blank only line).
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorStep {
    pub action: CursorAction,
    /// Final cursor position in pre-edit coordinates.
    pub target: Position,
    /// Whether this step may be followed by the newline step.
    pub newline_candidate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertPlan {
    pub batch: EditBatch,
    pub steps: Vec<CursorStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub actions: Vec<CursorAction>,
    /// Cursor positions after the edit (and after the newline step, if any).
    pub cursors: Vec<Position>,
    pub opened_line: bool,
}

fn literal(batch: &mut EditBatch, at: Position, terminator: char) -> CursorStep {
    batch.push(Edit::insert(at, terminator));
    CursorStep {
        action: CursorAction::Literal,
        target: at,
        newline_candidate: false,
    }
}

fn plan_cursor<D>(
    doc: &D,
    batch: &mut EditBatch,
    cursor: Position,
    rule: Option<&LanguageRule>,
    settings: &Settings,
) -> CursorStep
where
    D: LineSource + ?Sized,
{
    let terminator = rule.map_or(DEFAULT_TERMINATOR, |r| r.terminator);
    if !settings.enable || (rule.is_none() && settings.fallback == Fallback::Cursor) {
        return literal(batch, cursor, terminator);
    }

    if doc.is_blank(cursor.line) {
        if !settings.delete_empty_line {
            return literal(batch, cursor, terminator);
        }
        return match plan_empty_line(doc, cursor.line) {
            EmptyLinePlan::Delete { line, anchor } => {
                batch.push(Edit::DeleteLine { line });
                CursorStep {
                    action: CursorAction::DeletedLine,
                    target: anchor,
                    newline_candidate: false,
                }
            }
            EmptyLinePlan::Keep => CursorStep {
                action: CursorAction::Unchanged,
                target: cursor,
                newline_candidate: false,
            },
        };
    }

    let text = doc.line_text(cursor.line).unwrap_or_default();
    match LineQuery::new(&text, cursor.line, cursor.offset).decide(rule) {
        InsertionDecision::Skip { .. } => literal(batch, cursor, terminator),
        InsertionDecision::Insert(placement) => {
            let at = Position::new(cursor.line, placement.offset);
            let newline_candidate = !placement.preceded_by_close_bracket;
            if !placement.already_terminated {
                batch.push(Edit::insert(at, terminator));
                return CursorStep {
                    action: CursorAction::Placed {
                        offset: placement.offset,
                    },
                    target: at,
                    newline_candidate,
                };
            }
            CursorStep {
                action: CursorAction::AlreadyTerminated {
                    offset: placement.offset,
                },
                target: at,
                newline_candidate: newline_candidate
                    && settings.already_terminated == TerminatedPolicy::KeepNewline,
            }
        }
    }
}

/// Decide the edits for every cursor against the unmodified document.
pub fn plan_insert<D>(
    doc: &D,
    cursors: &[Position],
    rule: Option<&LanguageRule>,
    settings: &Settings,
) -> InsertPlan
where
    D: LineSource + ?Sized,
{
    let mut plan = InsertPlan::default();
    for cursor in cursors {
        let mut cursor = *cursor;
        cursor.clamp_to(doc.line_count(), |l| doc.line_len(l));
        let step = plan_cursor(doc, &mut plan.batch, cursor, rule, settings);
        plan.steps.push(step);
    }
    plan
}

/// Run the insert command on `buffer` for `cursors`.
///
/// Fails without touching the buffer when the edit batch cannot be applied
/// (read-only buffer, stale cursor); hosts surface that as a no-op.
pub fn insert_terminator(
    buffer: &mut Buffer,
    cursors: &[Position],
    rule: Option<&LanguageRule>,
    settings: &Settings,
) -> Result<InsertOutcome> {
    let plan = plan_insert(&*buffer, cursors, rule, settings);
    buffer
        .apply(&plan.batch)
        .context("applying terminator edits")?;

    let mut positions: Vec<Position> = plan
        .steps
        .iter()
        .map(|step| {
            let mut pos = plan.batch.map_position(step.target);
            pos.clamp_to(buffer.line_count(), |l| buffer.line_len(l));
            pos
        })
        .collect();

    let mut opened_line = false;
    if let [step] = plan.steps.as_slice()
        && settings.auto_newline
        && step.newline_candidate
    {
        let line = positions[0].line;
        if can_open_line_below(&*buffer, line, rule, settings.newline_rule) {
            positions[0] = buffer
                .open_line_below(line)
                .context("opening line below")?;
            opened_line = true;
        }
    }

    debug!(
        target: "actions.insert",
        buffer = buffer.name.as_str(),
        cursors = cursors.len(),
        edits = plan.batch.len(),
        opened_line,
        "insert_terminator"
    );
    Ok(InsertOutcome {
        actions: plan.steps.iter().map(|s| s.action).collect(),
        cursors: positions,
        opened_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_rules::brace_rule;

    fn run(text: &str, cursors: &[Position], settings: Settings) -> (String, InsertOutcome) {
        let mut buffer = Buffer::from_str("t", text).unwrap();
        let rule = brace_rule();
        let outcome = insert_terminator(&mut buffer, cursors, Some(&rule), &settings).unwrap();
        (buffer.contents(), outcome)
    }

    #[test]
    fn places_before_trailing_whitespace_and_opens_line() {
        let (text, out) = run("    x = 1   ", &[Position::new(0, 6)], Settings::default());
        assert_eq!(text, "    x = 1;   \n    ");
        assert!(out.opened_line);
        assert_eq!(out.cursors, vec![Position::new(1, 4)]);
        assert_eq!(out.actions, vec![CursorAction::Placed { offset: 9 }]);
    }

    #[test]
    fn close_bracket_after_offset_suppresses_newline() {
        let (text, out) = run("{ f(x) }", &[Position::new(0, 2)], Settings::default());
        assert_eq!(text, "{ f(x); }");
        assert!(!out.opened_line);
        assert_eq!(out.cursors, vec![Position::new(0, 7)]);
    }

    #[test]
    fn auto_newline_off_keeps_cursor_after_terminator() {
        let settings = Settings {
            auto_newline: false,
            ..Settings::default()
        };
        let (text, out) = run("a = b", &[Position::new(0, 1)], settings);
        assert_eq!(text, "a = b;");
        assert_eq!(out.cursors, vec![Position::new(0, 6)]);
    }

    #[test]
    fn skip_types_literally_at_cursor() {
        let (text, out) = run("for (i = 0 i < 3)", &[Position::new(0, 10)], Settings::default());
        assert_eq!(text, "for (i = 0; i < 3)");
        assert_eq!(out.actions, vec![CursorAction::Literal]);
        assert_eq!(out.cursors, vec![Position::new(0, 11)]);
        assert!(!out.opened_line);
    }

    #[test]
    fn disabled_types_literally() {
        let settings = Settings {
            enable: false,
            ..Settings::default()
        };
        let (text, _) = run("a = b  ", &[Position::new(0, 3)], settings);
        assert_eq!(text, "a =; b  ");
    }

    #[test]
    fn already_terminated_keep_newline_policy() {
        let (text, out) = run("a = b;", &[Position::new(0, 2)], Settings::default());
        assert_eq!(text, "a = b;\n");
        assert_eq!(out.actions, vec![CursorAction::AlreadyTerminated { offset: 6 }]);
        assert!(out.opened_line);
    }

    #[test]
    fn already_terminated_suppress_all_policy() {
        let settings = Settings {
            already_terminated: TerminatedPolicy::SuppressAll,
            ..Settings::default()
        };
        let (text, out) = run("a = b;", &[Position::new(0, 2)], settings);
        assert_eq!(text, "a = b;");
        assert!(!out.opened_line);
        assert_eq!(out.cursors, vec![Position::new(0, 6)]);
    }

    #[test]
    fn read_only_buffer_is_left_untouched() {
        let mut buffer = Buffer::from_str("t", "a = b").unwrap();
        buffer.set_read_only(true);
        let rule = brace_rule();
        let err = insert_terminator(
            &mut buffer,
            &[Position::new(0, 1)],
            Some(&rule),
            &Settings::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("read-only"));
        assert_eq!(buffer.contents(), "a = b");
    }

    #[test]
    fn plan_without_rule_follows_fallback() {
        let doc = ["value = 1   "];
        let cursor = [Position::new(0, 3)];
        let plan = plan_insert(&doc[..], &cursor, None, &Settings::default());
        assert_eq!(plan.steps[0].action, CursorAction::Literal);
        let line_end = Settings {
            fallback: Fallback::LineEnd,
            ..Settings::default()
        };
        let plan = plan_insert(&doc[..], &cursor, None, &line_end);
        assert_eq!(plan.steps[0].action, CursorAction::Placed { offset: 9 });
    }

    mod logging {
        use super::*;
        use std::io::Write;
        use std::sync::{Arc, Mutex, MutexGuard};
        use tracing::Level;
        use tracing::subscriber::with_default;
        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone)]
        struct BufferWriter {
            inner: Arc<Mutex<Vec<u8>>>,
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
        fn insert_emits_debug_event_without_line_text() {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_target(true)
                .with_ansi(false)
                .without_time()
                .with_writer(BufferWriter { inner: buf.clone() })
                .finish();

            let (text, _) = with_default(subscriber, || {
                run("secret = 1", &[Position::new(0, 0)], Settings::default())
            });
            assert_eq!(text, "secret = 1;\n");

            let log_output = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
            assert!(log_output.contains("DEBUG actions.insert:"));
            assert!(log_output.contains("insert_terminator"));
            assert!(log_output.contains("buffer=\"t\""));
            assert!(log_output.contains("opened_line=true"));
            assert!(!log_output.contains("secret"));
        }
    }
}
