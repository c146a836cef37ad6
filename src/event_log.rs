use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// The contents of `subagent_stop.json`, plus whatever had to be thrown away
/// to get there.
#[derive(Debug)]
pub struct Loaded {
    pub events: Vec<Value>,
    /// Set when a non-empty file was not a JSON array and was discarded.
    pub discarded: Option<anyhow::Error>,
}

/// Read the event log. Missing or blank files are an empty log; files that
/// are not a JSON array are treated as empty too, with the reason returned
/// in `discarded`. Only I/O failures other than "not found" are errors.
pub fn load(path: &Path) -> Result<Loaded> {
    let contents = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            let err = anyhow!(e).context(format!("reading {}", path.display()));
            return Ok(Loaded {
                events: Vec::new(),
                discarded: Some(err),
            });
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    if contents.trim().is_empty() {
        return Ok(Loaded {
            events: Vec::new(),
            discarded: None,
        });
    }

    let discarded = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Array(events)) => {
            return Ok(Loaded {
                events,
                discarded: None,
            });
        }
        Ok(_) => anyhow!("{} is not a JSON array, starting a new log", path.display()),
        Err(e) => anyhow!(e).context(format!(
            "parsing {}, starting a new log",
            path.display()
        )),
    };
    Ok(Loaded {
        events: Vec::new(),
        discarded: Some(discarded),
    })
}

/// Rewrite the whole log with two-space indentation.
///
/// This is a plain overwrite: two hooks running at once can each read the
/// same old log and the later write drops the other's event.
pub fn save(path: &Path, events: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(events).context("serializing event log")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Load, push `event` at the end, save. Returns the new length and anything
/// discarded while loading.
pub fn append(path: &Path, event: Value) -> Result<(usize, Option<anyhow::Error>)> {
    let Loaded {
        mut events,
        discarded,
    } = load(path)?;
    events.push(event);
    save(path, &events)?;
    Ok((events.len(), discarded))
}
