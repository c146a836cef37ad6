use crate::project::DEFAULT_LOG_DIR;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FILENAME: &str = ".claude/subagent_stop.toml";

/// Optional per-project settings stored in `.claude/subagent_stop.toml`.
///
/// ```toml
/// log_dir = ".claude/logs"
/// chat = true
/// ```
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Log directory, relative to the project root unless absolute.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Capture transcripts even when `--chat` is not passed.
    #[serde(default)]
    pub chat: bool,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            chat: false,
        }
    }
}

impl Settings {
    /// Load settings from under `root`. A missing file yields defaults and is
    /// not created.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(FILENAME);
        match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}
