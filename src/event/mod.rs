//! Event Module - the single ordered stream of run, test and step events
//!
//! Key types:
//! - `Event`: envelope with timestamp + kind
//! - `EventKind`: 7 variants across 3 levels (run/test/step)
//! - `EventSink`: thread-safe, append-only history + line-oriented writer
//! - `EventEmitter`: trait for dependency injection
//! - `NoopEmitter`: zero-cost no-op for testing

mod emitter;
mod log;
mod sink;

pub use emitter::{EventEmitter, NoopEmitter};
pub use log::{
    Category, Event, EventKind, ResultInfo, RunInfo, RunSummary, StepFinish, StepStart,
    TestLocation, TestRef, TestResult,
};
pub use sink::{EventSink, WireFormat};
