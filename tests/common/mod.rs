//! Shared helpers for integration tests

#![allow(dead_code)]

use pw_reporter::testing::{CaptureBuffer, MockBrowser};
use pw_reporter::{EventSink, Reporter, WireFormat};

/// Reporter over a fresh mock library, writing compact records to a buffer
pub fn capturing_reporter(browser: &MockBrowser) -> (CaptureBuffer, Reporter) {
    let buffer = CaptureBuffer::new();
    let sink = EventSink::new(buffer.clone(), WireFormat::Compact);
    (buffer, Reporter::new(browser.api(), sink))
}

/// `event` field of every record in the history
pub fn event_names(sink: &EventSink) -> Vec<&'static str> {
    sink.with_events(|events| events.iter().map(|e| e.kind.wire_name()).collect())
}
