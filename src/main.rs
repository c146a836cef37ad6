mod error_log;
mod event;
mod event_log;
mod hook;
mod project;
mod settings;
mod transcript;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use clap::error::ErrorKind;
use error_log::Failure;
use hook::Hook;
use project::{LogLayout, ProjectRoot};
use settings::Settings;
use std::any::Any;
use std::io::{self, Read};
use std::panic::{self, UnwindSafe};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt};

/// SubagentStop hook: appends each event to `.claude/logs/subagent_stop.json`.
///
/// Always exits 0. Failures go to `.claude/logs/hook_errors.log`.
#[derive(Debug, Parser)]
#[command(name = "subagent-stop-hook", version, about)]
struct Cli {
    /// Also archive the subagent transcript as a JSON array under a dated directory
    #[arg(long)]
    chat: bool,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SUBAGENT_STOP_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn run() {
    let (chat, bad_args) = match Cli::try_parse() {
        Ok(cli) => (cli.chat, None),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        }
        Err(e) => (false, Some(e)),
    };

    let hook = Hook::new(&ProjectRoot::resolve(), chat, Local::now());
    if let Some(e) = bad_args {
        let err = anyhow::Error::new(e).context("parsing arguments, continuing without --chat");
        hook.record(Failure::Internal, &err);
    }

    let outcome = read_stdin()
        .map_err(|error| hook::Fault {
            kind: Failure::Input,
            error,
        })
        .and_then(|input| hook.handle(&input));
    match outcome {
        Ok(report) => debug!(?report, "done"),
        Err(fault) => hook.record(fault.kind, &fault.error),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}

/// Where a panic gets recorded: the project's configured log directory,
/// resolved afresh since the panicking run's state is gone.
fn panic_log_dir(root: &ProjectRoot) -> PathBuf {
    let settings = Settings::load(&root.path).unwrap_or_default();
    LogLayout::new(&root.path, &settings.log_dir).log_dir
}

/// Run `body`, turning a panic into an `internal` line in the error log.
fn guard(log_dir: impl FnOnce() -> PathBuf, body: impl FnOnce() + UnwindSafe) {
    if let Err(payload) = panic::catch_unwind(body) {
        let err = anyhow!("panic: {}", panic_message(payload.as_ref()));
        error_log::record(&log_dir(), Failure::Internal, &err);
    }
}

fn main() {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    init_tracing();
    panic::set_hook(Box::new(|info| error!("{info}")));

    guard(|| panic_log_dir(&ProjectRoot::resolve()), run);
}
