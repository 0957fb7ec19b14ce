//! EventSink - timestamped, append-only event stream
//!
//! Every record is stamped, appended to the in-memory history and written to
//! the output channel as one JSON document, flushed immediately. Writers are
//! serialized under one lock so records never interleave.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::log::{Event, EventKind};
use crate::config::{OutputTarget, ReporterConfig};
use crate::error::Result;

/// How each record is laid out on the output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// One JSON object per line (NDJSON)
    #[default]
    Compact,
    /// Indented JSON, one object per record spanning several lines
    Pretty,
}

struct Channel {
    writer: Box<dyn Write + Send>,
    last_stamp: Option<DateTime<Local>>,
}

/// Thread-safe event sink shared by the instrumentor and the lifecycle bridge
#[derive(Clone)]
pub struct EventSink {
    events: Arc<RwLock<Vec<Event>>>,
    channel: Arc<Mutex<Channel>>,
    format: WireFormat,
}

impl EventSink {
    /// Create a sink writing to an arbitrary channel
    pub fn new(writer: impl Write + Send + 'static, format: WireFormat) -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            channel: Arc::new(Mutex::new(Channel {
                writer: Box::new(writer),
                last_stamp: None,
            })),
            format,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout(), WireFormat::Compact)
    }

    /// History-only sink (output is dropped)
    pub fn discard() -> Self {
        Self::new(io::sink(), WireFormat::Compact)
    }

    /// Build the sink described by a reporter config
    pub fn from_config(config: &ReporterConfig) -> Result<Self> {
        let format = config.wire_format();
        let sink = match &config.output {
            OutputTarget::Stdout => Self::new(io::stdout(), format),
            OutputTarget::Stderr => Self::new(io::stderr(), format),
            OutputTarget::File(path) => {
                let file = File::create(path)?;
                tracing::info!(path = %path.display(), "Writing events to file");
                Self::new(BufWriter::new(file), format)
            }
        };
        Ok(sink)
    }

    /// Stamp, store and write one event
    ///
    /// Never fails: encoding problems degrade to a textual record and
    /// channel errors are logged and dropped.
    pub fn record(&self, kind: EventKind) {
        let mut channel = self.channel.lock();

        // Wall clock may step backwards; the stream must not.
        let now = Local::now();
        let timestamp = match channel.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        channel.last_stamp = Some(timestamp);

        let event = Event { kind, timestamp };
        let encoded = self.encode(&event);
        self.events.write().push(event);

        let written = writeln!(channel.writer, "{}", encoded);
        if let Err(e) = written.and_then(|_| channel.writer.flush()) {
            tracing::warn!(error = %e, "Failed to write event record");
        }
    }

    fn encode(&self, event: &Event) -> String {
        let encoded = match self.format {
            WireFormat::Compact => serde_json::to_string(event),
            WireFormat::Pretty => serde_json::to_string_pretty(event),
        };
        encoded.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                event = event.kind.wire_name(),
                "Falling back to textual record"
            );
            fallback_record(event)
        })
    }

    /// Get all events (cloned - use `with_events` for zero-copy access)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Zero-copy access to events via callback
    ///
    /// Holds read lock for duration of callback - keep it short.
    pub fn with_events<T>(&self, f: impl FnOnce(&[Event]) -> T) -> T {
        f(&self.events.read())
    }

    /// Runner lifecycle events only
    pub fn lifecycle_events(&self) -> Vec<Event> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.kind.is_lifecycle_event())
                .cloned()
                .collect()
        })
    }

    /// Instrumented step events only
    pub fn step_events(&self) -> Vec<Event> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| !e.kind.is_lifecycle_event())
                .cloned()
                .collect()
        })
    }

    /// Serialize the whole history as a JSON array
    pub fn to_json(&self) -> Value {
        self.with_events(|events| serde_json::to_value(events).unwrap_or(Value::Null))
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fallback_record(event: &Event) -> String {
    serde_json::json!({
        "event": event.kind.wire_name(),
        "timestamp": event.timestamp.to_rfc3339(),
        "payload": format!("{:?}", event.kind),
    })
    .to_string()
}

impl Default for EventSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("len", &self.len())
            .field("format", &self.format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Category, RunInfo, StepStart, TestLocation, TestRef};
    use crate::testing::CaptureBuffer;

    fn step_begin(title: &str) -> EventKind {
        EventKind::StepBegin {
            step: StepStart {
                title: title.into(),
                category: Category::Action,
            },
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn new_sink_starts_empty() {
        let sink = EventSink::discard();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn record_writes_one_line_per_event() {
        let buffer = CaptureBuffer::new();
        let sink = EventSink::new(buffer.clone(), WireFormat::Compact);

        sink.record(EventKind::RunBegin(RunInfo {
            rootdir: "/work".into(),
            args: vec![],
        }));
        sink.record(step_begin("page.reload()"));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["event"], "onBegin");
        assert_eq!(first["rootdir"], "/work");
        assert!(first["timestamp"].is_string());
    }

    #[test]
    fn record_flushes_immediately() {
        let buffer = CaptureBuffer::new();
        let sink = EventSink::new(buffer.clone(), WireFormat::Compact);

        sink.record(step_begin("page.goto(https://example.com)"));
        assert_eq!(buffer.lines().len(), 1);
        assert_eq!(buffer.flushes(), 1);
    }

    #[test]
    fn pretty_format_spans_lines_but_parses() {
        let buffer = CaptureBuffer::new();
        let sink = EventSink::new(buffer.clone(), WireFormat::Pretty);

        sink.record(EventKind::TestBegin {
            test: TestRef {
                id: "t::a".into(),
                location: TestLocation {
                    file: "t.py".into(),
                    line: Some(3),
                    name: "a".into(),
                },
            },
        });

        let text = buffer.contents();
        assert!(text.lines().count() > 1);
        let record: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(record["test"]["location"]["line"], 3);
    }

    #[test]
    fn history_keeps_emission_order() {
        let sink = EventSink::discard();
        for i in 0..5 {
            sink.record(step_begin(&format!("step {}", i)));
        }

        let titles: Vec<String> = sink.with_events(|events| {
            events
                .iter()
                .filter_map(|e| e.kind.step_title().map(String::from))
                .collect()
        });
        assert_eq!(titles, ["step 0", "step 1", "step 2", "step 3", "step 4"]);
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let sink = EventSink::discard();
        for _ in 0..50 {
            sink.record(EventKind::TestError { error: None });
        }

        let events = sink.events();
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn broken_channel_does_not_fail_record() {
        let sink = EventSink::new(BrokenPipe, WireFormat::Compact);
        sink.record(EventKind::TestError {
            error: Some("boom".into()),
        });
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn lifecycle_and_step_filters_partition_history() {
        let sink = EventSink::discard();
        sink.record(EventKind::RunBegin(RunInfo::default()));
        sink.record(step_begin("page.reload()"));
        sink.record(EventKind::TestError { error: None });

        assert_eq!(sink.lifecycle_events().len(), 2);
        assert_eq!(sink.step_events().len(), 1);
        assert_eq!(sink.to_json().as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn concurrent_records_never_interleave() {
        use std::thread;

        let buffer = CaptureBuffer::new();
        let sink = EventSink::new(buffer.clone(), WireFormat::Compact);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for j in 0..25 {
                        sink.record(step_begin(&format!("worker {} step {}", i, j)));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 200);
        assert!(lines
            .iter()
            .all(|line| serde_json::from_str::<Value>(line).is_ok()));
        assert_eq!(sink.len(), 200);
    }

    #[test]
    fn fallback_record_is_valid_json() {
        let event = Event {
            kind: EventKind::TestError {
                error: Some("x".into()),
            },
            timestamp: Local::now(),
        };
        let record: Value = serde_json::from_str(&fallback_record(&event)).unwrap();
        assert_eq!(record["event"], "onError");
        assert!(record["payload"].as_str().unwrap().contains("TestError"));
    }
}
