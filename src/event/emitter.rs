//! EventEmitter Trait - abstraction for event emission
//!
//! The instrumentor and the lifecycle bridge only see this trait:
//! the real `EventSink` in production, `NoopEmitter` or a custom mock in tests.

use super::log::EventKind;
use super::sink::EventSink;

/// Trait for emitting events into the stream
pub trait EventEmitter: Send + Sync {
    /// Emit an event; never fails from the caller's point of view
    fn emit(&self, kind: EventKind);
}

impl EventEmitter for EventSink {
    fn emit(&self, kind: EventKind) {
        self.record(kind)
    }
}

/// No-op emitter for testing
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl EventEmitter for NoopEmitter {
    fn emit(&self, _kind: EventKind) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RunSummary;
    use std::sync::Arc;

    #[test]
    fn event_emitter_trait_is_object_safe() {
        fn accepts_emitter(_: &dyn EventEmitter) {}

        accepts_emitter(&EventSink::discard());
        accepts_emitter(&NoopEmitter::new());
    }

    #[test]
    fn sink_as_emitter_records_history() {
        let sink = EventSink::discard();
        let emitter: Arc<dyn EventEmitter> = Arc::new(sink.clone());

        emitter.emit(EventKind::RunEnd(RunSummary::default()));

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn noop_emitter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoopEmitter>();
        NoopEmitter.emit(EventKind::TestError { error: None });
    }
}
