use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const SESSION_PREFIX_LEN: usize = 8;

/// A JSONL transcript reshaped into a list of entries.
#[derive(Debug, PartialEq)]
pub struct Snapshot {
    pub entries: Vec<Value>,
}

impl Snapshot {
    /// Parse a JSONL transcript. Blank lines are ignored. Returns the
    /// snapshot and any lines that failed to parse (with 1-based line number
    /// and error); those lines are left out of the snapshot. Lines are split
    /// on raw bytes so one line of invalid UTF-8 only costs that line.
    pub fn parse(contents: &[u8]) -> (Self, Vec<(usize, String)>) {
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        for (i, line) in contents.split(|&b| b == b'\n').enumerate() {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<Value>(line) {
                Ok(val) => entries.push(val),
                Err(e) => errors.push((i + 1, format!("{e}"))),
            }
        }

        (Self { entries }, errors)
    }

    pub fn read(path: &Path) -> Result<(Self, Vec<(usize, String)>)> {
        let contents = fs::read(path)
            .with_context(|| format!("reading transcript {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Write the entries as an indented JSON array.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .context("serializing transcript snapshot")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }
}

/// First eight characters of the session id, or all of it when shorter.
pub fn session_prefix(session_id: &str) -> &str {
    match session_id.char_indices().nth(SESSION_PREFIX_LEN) {
        Some((end, _)) => &session_id[..end],
        None => session_id,
    }
}

/// `transcript_subagent_<session8>_<YYYYMMDD_HHMMSS>.json`
pub fn archive_file_name(session_id: &str, now: &DateTime<Local>) -> String {
    format!(
        "transcript_subagent_{}_{}.json",
        session_prefix(session_id),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Snapshot `source` into `dated_dir`, creating the directory if needed.
/// Returns the archive path and the skipped lines.
pub fn archive(
    source: &Path,
    dated_dir: &Path,
    session_id: &str,
    now: &DateTime<Local>,
) -> Result<(PathBuf, Vec<(usize, String)>)> {
    let (snapshot, skipped) = Snapshot::read(source)?;
    fs::create_dir_all(dated_dir)
        .with_context(|| format!("creating {}", dated_dir.display()))?;
    let dest = dated_dir.join(archive_file_name(session_id, now));
    snapshot.write(&dest)?;
    Ok((dest, skipped))
}
