//! Diagnostic trace records for resolutions.
//!
//! Every successful resolution produces one entry shaped like
//! `{ level, message, data: { address, params, value }, tags, timestamp }`.
//! Sinks must never fail the resolution they describe, so `TraceSink::emit`
//! has no error channel: sinks swallow their own I/O failures.

use std::io::{stderr, stdout, Write};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use humantime::format_rfc3339;
use serde_json::{json, Map, Value as JsonValue};

use crate::value::Value;

pub const ALLOWED_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "fatal"];

const TRACE_MESSAGE: &str = "lodash variable resolved";
const CAPTURE_LIMIT: usize = 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    pub address: String,
    pub params: Vec<Value>,
    pub value: Value,
}

impl TraceRecord {
    pub fn new(address: impl Into<String>, params: Vec<Value>, value: Value) -> Self {
        Self {
            address: address.into(),
            params,
            value,
        }
    }

    fn data(&self) -> JsonValue {
        json!({
            "address": self.address,
            "params": self.params.iter().map(Value::to_json).collect::<Vec<_>>(),
            "value": self.value.to_json(),
        })
    }
}

pub fn validate_level(level: &str) -> Result<()> {
    if ALLOWED_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(anyhow!("unsupported log level: {level}"))
    }
}

fn current_timestamp() -> String {
    let now = std::time::SystemTime::now();
    format_rfc3339(now).to_string()
}

/// Builds the log entry for a record. Tags are limited to scalar values.
pub fn trace_entry(record: &TraceRecord, level: &str, tags: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut entry = Map::new();
    entry.insert("level".to_string(), JsonValue::String(level.to_string()));
    entry.insert("message".to_string(), JsonValue::String(TRACE_MESSAGE.to_string()));
    entry.insert("data".to_string(), record.data());

    let stable: Map<String, JsonValue> = tags
        .iter()
        .filter(|(_, val)| matches!(val, JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)))
        .map(|(key, val)| (key.clone(), val.clone()))
        .collect();
    if !stable.is_empty() {
        entry.insert("tags".to_string(), JsonValue::Object(stable));
    }

    entry.insert("timestamp".to_string(), JsonValue::String(current_timestamp()));
    entry
}

pub trait TraceSink: Send + Sync {
    fn emit(&self, record: &TraceRecord);

    /// Whether emitted records go anywhere.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn emit(&self, _record: &TraceRecord) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Writes one compact JSON line per record. `error` and `fatal` entries always
/// go to stderr.
#[derive(Clone, Debug)]
pub struct JsonLineSink {
    stream: Stream,
    level: String,
    tags: Map<String, JsonValue>,
}

impl JsonLineSink {
    pub fn new(stream: Stream, level: impl Into<String>) -> Result<Self> {
        let level = level.into();
        validate_level(&level)?;
        Ok(Self::unchecked(stream, level))
    }

    fn unchecked(stream: Stream, level: String) -> Self {
        let mut tags = Map::new();
        tags.insert("component".to_string(), JsonValue::String("resolver".to_string()));
        Self { stream, level, tags }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.tags.insert(key.into(), value);
        self
    }

    /// Stream the entry for this sink's level is written to.
    pub fn target(&self) -> Stream {
        if matches!(self.level.as_str(), "error" | "fatal") {
            Stream::Stderr
        } else {
            self.stream
        }
    }

    pub fn render(&self, record: &TraceRecord) -> Option<String> {
        serde_json::to_string(&trace_entry(record, &self.level, &self.tags)).ok()
    }

    /// Writes one line to `out`, ignoring write failures.
    pub fn write_to<W: Write>(&self, out: &mut W, record: &TraceRecord) {
        if let Some(line) = self.render(record) {
            let _ = writeln!(out, "{}", line);
        }
    }
}

/// Info-level lines on stderr.
impl Default for JsonLineSink {
    fn default() -> Self {
        Self::unchecked(Stream::Stderr, "info".to_string())
    }
}

impl TraceSink for JsonLineSink {
    fn emit(&self, record: &TraceRecord) {
        match self.target() {
            Stream::Stderr => self.write_to(&mut stderr().lock(), record),
            Stream::Stdout => self.write_to(&mut stdout().lock(), record),
        }
    }
}

/// Keeps entries in memory, up to a fixed cap. Past the cap a single
/// truncation notice is appended and later records are dropped.
#[derive(Debug, Default)]
pub struct CaptureSink {
    inner: Mutex<CaptureState>,
}

#[derive(Debug, Default)]
struct CaptureState {
    entries: Vec<JsonValue>,
    records: Vec<TraceRecord>,
    truncated: bool,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured log entries, including a truncation notice if one was written.
    pub fn entries(&self) -> Vec<JsonValue> {
        self.inner
            .lock()
            .map(|state| state.entries.clone())
            .unwrap_or_default()
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        self.inner
            .lock()
            .map(|state| state.records.clone())
            .unwrap_or_default()
    }

    pub fn is_truncated(&self) -> bool {
        self.inner.lock().map(|state| state.truncated).unwrap_or(false)
    }
}

impl TraceSink for CaptureSink {
    fn emit(&self, record: &TraceRecord) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        if state.records.len() >= CAPTURE_LIMIT {
            if !state.truncated {
                let notice = json!({
                    "level": "warn",
                    "message": "Trace capture buffer truncated",
                    "tags": { "component": "resolver", "reason": "log-overflow" }
                });
                state.entries.push(notice);
                state.truncated = true;
            }
            return;
        }
        let entry = trace_entry(record, "info", &Map::new());
        state.entries.push(JsonValue::Object(entry));
        state.records.push(record.clone());
    }
}
