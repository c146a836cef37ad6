use chrono::{DateTime, Local};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that pins the project root.
pub const ROOT_ENV: &str = "CLAUDE_PROJECT_ROOT";
/// Directory whose presence marks a project root during discovery.
pub const MARKER_DIR: &str = ".claude";
/// Log directory used when the settings file does not override it.
pub const DEFAULT_LOG_DIR: &str = ".claude/logs";

const EVENT_LOG: &str = "subagent_stop.json";

/// How the project root was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Env,
    Marker,
    Cwd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    pub path: PathBuf,
    pub source: RootSource,
}

impl ProjectRoot {
    /// Resolve from the process environment and working directory.
    pub fn resolve() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve_from(env::var_os(ROOT_ENV).map(PathBuf::from), &cwd)
    }

    /// Explicit override, then the nearest ancestor of `cwd` (inclusive)
    /// holding a `.claude` directory, then `cwd` itself. An empty override
    /// counts as unset.
    pub fn resolve_from(env_root: Option<PathBuf>, cwd: &Path) -> Self {
        if let Some(path) = env_root.filter(|p| !p.as_os_str().is_empty()) {
            return Self {
                path,
                source: RootSource::Env,
            };
        }

        let start = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());
        match start.ancestors().find(|dir| dir.join(MARKER_DIR).exists()) {
            Some(dir) => Self {
                path: dir.to_path_buf(),
                source: RootSource::Marker,
            },
            None => Self {
                path: start,
                source: RootSource::Cwd,
            },
        }
    }
}

/// Where the hook reads and writes, derived from the root and the configured
/// log directory.
#[derive(Debug, Clone)]
pub struct LogLayout {
    pub log_dir: PathBuf,
}

impl LogLayout {
    pub fn new(root: &Path, log_dir: &Path) -> Self {
        Self {
            log_dir: root.join(log_dir),
        }
    }

    pub fn event_log(&self) -> PathBuf {
        self.log_dir.join(EVENT_LOG)
    }

    /// `<log_dir>/<YYYYMMDD>`
    pub fn dated_dir(&self, now: &DateTime<Local>) -> PathBuf {
        self.log_dir.join(now.format("%Y%m%d").to_string())
    }
}
