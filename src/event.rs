use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// A SubagentStop event as received on stdin.
///
/// The raw object is kept intact so it can be logged verbatim; the accessors
/// read the few fields the hook cares about, with defaults when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SubagentStop {
    raw: Map<String, Value>,
}

/// What `transcript_path` holds, if anything.
#[derive(Debug, PartialEq)]
pub enum TranscriptPath<'a> {
    Absent,
    Path(&'a str),
    NotAString(&'a Value),
}

impl SubagentStop {
    pub fn parse(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input).context("parsing stdin")?;
        let raw = match value {
            Value::Object(raw) => raw,
            other => bail!("expected a JSON object on stdin, got {}", kind_of(&other)),
        };
        let event = Self { raw };
        event.ensure_loggable()?;
        Ok(event)
    }

    /// The log stores events one level deeper, inside its array. An event
    /// that only just fits the parser's nesting limit on stdin would make
    /// the whole log unreadable on the next run.
    fn ensure_loggable(&self) -> Result<()> {
        let wrapped = serde_json::to_string(&[&self.raw]).context("serializing event")?;
        serde_json::from_str::<Value>(&wrapped)
            .map(drop)
            .context("event is nested too deeply to be stored in the event log")
    }

    pub fn session_id(&self) -> &str {
        self.raw
            .get("session_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn stop_hook_active(&self) -> bool {
        self.raw
            .get("stop_hook_active")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn transcript_path(&self) -> TranscriptPath<'_> {
        match self.raw.get("transcript_path") {
            None => TranscriptPath::Absent,
            Some(Value::String(s)) => TranscriptPath::Path(s),
            Some(other) => TranscriptPath::NotAString(other),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.raw)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
