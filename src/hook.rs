use crate::error_log::{self, Failure};
use crate::event::{SubagentStop, TranscriptPath};
use crate::event_log;
use crate::project::{LogLayout, ProjectRoot};
use crate::settings::Settings;
use crate::transcript;
use anyhow::{Context, anyhow};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A failure that ends the invocation early. Everything else is recorded
/// where it happens and the hook carries on.
#[derive(Debug)]
pub struct Fault {
    pub kind: Failure,
    pub error: anyhow::Error,
}

impl Fault {
    fn of(kind: Failure) -> impl FnOnce(anyhow::Error) -> Self {
        move |error| Self { kind, error }
    }
}

/// What a successful invocation did.
#[derive(Debug, PartialEq)]
pub struct Report {
    /// Length of the event log after appending.
    pub logged: usize,
    pub archive: Option<PathBuf>,
}

/// One SubagentStop invocation: where to write, whether to capture the
/// transcript, and the clock reading every timestamp comes from.
pub struct Hook {
    layout: LogLayout,
    chat: bool,
    now: DateTime<Local>,
}

impl Hook {
    /// Load project settings under `root`. A broken settings file is recorded
    /// in the default log directory and ignored.
    pub fn new(root: &ProjectRoot, chat: bool, now: DateTime<Local>) -> Self {
        debug!(root = %root.path.display(), source = ?root.source, "resolved project root");
        let settings = Settings::load(&root.path).unwrap_or_else(|err| {
            let fallback = LogLayout::new(&root.path, &Settings::default().log_dir);
            error_log::record(&fallback.log_dir, Failure::Settings, &err);
            Settings::default()
        });
        Self {
            layout: LogLayout::new(&root.path, &settings.log_dir),
            chat: chat || settings.chat,
            now,
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.layout.log_dir
    }

    pub fn record(&self, kind: Failure, err: &anyhow::Error) {
        error_log::record(self.log_dir(), kind, err);
    }

    /// Log the event on stdin and, when asked, archive its transcript.
    pub fn handle(&self, input: &str) -> Result<Report, Fault> {
        let event = SubagentStop::parse(input).map_err(Fault::of(Failure::Input))?;
        let session_id = event.session_id().to_string();
        debug!(
            session_id = %session_id,
            stop_hook_active = event.stop_hook_active(),
            "received SubagentStop"
        );
        let source = match event.transcript_path() {
            TranscriptPath::Absent => None,
            TranscriptPath::Path(p) => Some(Ok(PathBuf::from(p))),
            TranscriptPath::NotAString(v) => Some(Err(anyhow!("transcript_path is not a string: {v}"))),
        };

        fs::create_dir_all(self.log_dir())
            .with_context(|| format!("creating {}", self.log_dir().display()))
            .map_err(Fault::of(Failure::Internal))?;

        let (logged, discarded) = event_log::append(&self.layout.event_log(), event.into_value())
            .map_err(Fault::of(Failure::Internal))?;
        if let Some(err) = discarded {
            self.record(Failure::State, &err);
        }
        debug!(events = logged, "appended to event log");

        let archive = match source {
            Some(source) if self.chat => self.capture(source, &session_id),
            _ => None,
        };
        Ok(Report { logged, archive })
    }

    /// Transcript capture runs after the event is safely logged, so its
    /// failures are recorded and never reported upward.
    fn capture(&self, source: anyhow::Result<PathBuf>, session_id: &str) -> Option<PathBuf> {
        let source = match source {
            Ok(path) => path,
            Err(err) => {
                self.record(Failure::Transcript, &err);
                return None;
            }
        };
        if !source.is_file() {
            debug!(path = %source.display(), "transcript not found, skipping");
            return None;
        }

        let dated = self.layout.dated_dir(&self.now);
        match transcript::archive(&source, &dated, session_id, &self.now) {
            Ok((dest, skipped)) => {
                for (line, err) in &skipped {
                    debug!(line, "skipped transcript line: {err}");
                }
                debug!(path = %dest.display(), skipped = skipped.len(), "archived transcript");
                Some(dest)
            }
            Err(err) => {
                self.record(Failure::Transcript, &err);
                None
            }
        }
    }
}
