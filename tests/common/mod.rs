#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Run the hook with `root` as `CLAUDE_PROJECT_ROOT` and `stdin` piped in.
/// Returns (exit code, stdout, stderr).
pub fn run_hook(root: &Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_subagent-stop-hook"));
    command
        .args(args)
        .current_dir(root)
        .env("CLAUDE_PROJECT_ROOT", root)
        .env_remove("SUBAGENT_STOP_LOG");
    run(command, stdin)
}

/// Run the hook from `cwd` with `root` as `CLAUDE_PROJECT_ROOT`.
pub fn run_hook_from(cwd: &Path, root: &Path, stdin: &str) -> (i32, String, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_subagent-stop-hook"));
    command
        .current_dir(cwd)
        .env("CLAUDE_PROJECT_ROOT", root)
        .env_remove("SUBAGENT_STOP_LOG");
    run(command, stdin)
}

/// Run the hook from `cwd` without a root override, so it has to discover one.
pub fn run_hook_in(cwd: &Path, stdin: &str) -> (i32, String, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_subagent-stop-hook"));
    command
        .current_dir(cwd)
        .env_remove("CLAUDE_PROJECT_ROOT")
        .env_remove("SUBAGENT_STOP_LOG");
    run(command, stdin)
}

fn run(mut command: Command, stdin: &str) -> (i32, String, String) {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

pub fn log_dir(root: &Path) -> PathBuf {
    root.join(".claude").join("logs")
}

pub fn read_event_log(root: &Path) -> Vec<serde_json::Value> {
    let contents = fs::read_to_string(log_dir(root).join("subagent_stop.json")).unwrap();
    serde_json::from_str(&contents).unwrap()
}

/// Contents of the error log, or "" if nothing has been written.
pub fn read_error_log(root: &Path) -> String {
    fs::read_to_string(log_dir(root).join("hook_errors.log")).unwrap_or_default()
}

/// Every file under the dated (`YYYYMMDD`) subdirectories of the log dir.
pub fn archived_transcripts(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(log_dir(root)) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .flat_map(|dir| fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()))
        .collect();
    files.sort();
    files
}
