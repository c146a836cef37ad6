use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::warn;

pub const FILENAME: &str = "hook_errors.log";

/// Which stage of the hook a failure came from. The label is written into
/// each error log line so failures can be told apart when grepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Standard input was unreadable, not JSON, or not a JSON object.
    Input,
    /// Transcript capture failed after the event was already logged.
    Transcript,
    /// The existing event log was corrupt and has been discarded.
    State,
    /// The settings file could not be read or parsed.
    Settings,
    /// Anything else: filesystem errors on the event log, bad arguments, panics.
    Internal,
}

impl Failure {
    pub fn label(self) -> &'static str {
        match self {
            Failure::Input => "JSON decode",
            Failure::Transcript => "transcript",
            Failure::State => "event log",
            Failure::Settings => "settings",
            Failure::Internal => "internal",
        }
    }
}

/// Render one error log line, newline included.
pub fn format_line(now: &DateTime<Local>, kind: Failure, message: &str) -> String {
    // Keep one failure per line even when the error text spans several.
    let message = message.replace('\n', " | ");
    format!(
        "{}: subagent_stop {} error: {message}\n",
        now.format("%Y-%m-%dT%H:%M:%S%.6f"),
        kind.label()
    )
}

/// Append a failure to `<log_dir>/hook_errors.log`.
///
/// Best-effort: the directory is created if missing, and any I/O error along
/// the way is dropped. The caller never learns whether the write happened.
pub fn record(log_dir: &Path, kind: Failure, err: &anyhow::Error) {
    let message = format!("{err:#}");
    warn!(category = kind.label(), "{message}");
    let line = format_line(&Local::now(), kind, &message);
    let _ = append(log_dir, &line);
}

fn append(log_dir: &Path, line: &str) -> std::io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(FILENAME))?;
    file.write_all(line.as_bytes())
}
