//! Step Instrumentor - wraps one operation with begin/end step events
//!
//! One wrapper for both calling conventions: title and category handling are
//! shared, only the call-and-await mechanics differ. The wrapped operation
//! returns exactly what the original returned, including the same boxed
//! error value on failure.

use std::sync::Arc;
use std::time::Instant;

use futures::future::FutureExt;

use super::catalog::OperationDescriptor;
use crate::event::{Category, EventEmitter, EventKind, StepFinish, StepStart};
use crate::surface::{Body, Call, Operation, OperationResult};

/// Error text of a step whose future was dropped before completing
pub const CANCELLED: &str = "cancelled";

/// Error text of a step whose operation panicked
pub const PANICKED: &str = "panicked";

/// Produces instrumented versions of operations
#[derive(Clone)]
pub struct StepInstrumentor {
    emitter: Arc<dyn EventEmitter>,
}

impl StepInstrumentor {
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Self {
        Self { emitter }
    }

    /// Wrap `operation` so every call is reported as a step
    ///
    /// An operation that is already instrumented is returned unchanged.
    pub fn wrap(&self, operation: Operation, descriptor: &OperationDescriptor) -> Operation {
        if operation.is_instrumented() {
            return operation;
        }

        let category = descriptor.category;
        let rule = descriptor.title;
        let emitter = Arc::clone(&self.emitter);

        let body = match operation.body {
            Body::Blocking(inner) => Body::Blocking(Arc::new(move |call: &Call| {
                let scope = StepScope::begin(Arc::clone(&emitter), rule.render(call), category);
                let result = inner(call);
                scope.finish(&result);
                result
            })),
            Body::Suspending(inner) => Body::Suspending(Arc::new(move |call: Call| {
                let inner = Arc::clone(&inner);
                let emitter = Arc::clone(&emitter);
                let title = rule.render(&call);
                async move {
                    let scope = StepScope::begin(emitter, title, category);
                    let result = inner(call).await;
                    scope.finish(&result);
                    result
                }
                .boxed()
            })),
        };

        Operation {
            body,
            instrumented: true,
        }
    }
}

impl std::fmt::Debug for StepInstrumentor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepInstrumentor").finish_non_exhaustive()
    }
}

/// Begin/end bracket of one step
///
/// Dropping an unfinished scope (future cancelled, operation panicked)
/// still emits the matching `StepEnd`.
struct StepScope {
    emitter: Arc<dyn EventEmitter>,
    title: String,
    category: Category,
    started: Instant,
    finished: bool,
}

impl StepScope {
    fn begin(emitter: Arc<dyn EventEmitter>, title: String, category: Category) -> Self {
        let started = Instant::now();
        emitter.emit(EventKind::StepBegin {
            step: StepStart {
                title: title.clone(),
                category,
            },
        });
        Self {
            emitter,
            title,
            category,
            started,
            finished: false,
        }
    }

    fn finish(mut self, result: &OperationResult) {
        let error = result.as_ref().err().map(|e| e.to_string());
        self.end(error);
    }

    fn end(&mut self, error: Option<String>) {
        self.finished = true;
        let duration = self.started.elapsed().as_secs_f64() * 1000.0;
        self.emitter.emit(EventKind::StepEnd {
            step: StepFinish {
                title: std::mem::take(&mut self.title),
                category: Some(self.category),
                duration,
                error,
            },
        });
    }
}

impl Drop for StepScope {
    fn drop(&mut self) {
        if !self.finished {
            let reason = if std::thread::panicking() {
                PANICKED
            } else {
                CANCELLED
            };
            self.end(Some(reason.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventSink};
    use crate::instrument::catalog::descriptor;
    use crate::surface::{AutomationApi, CallingConvention, OperationError, TargetKind, TargetType};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    struct NotFound;

    impl std::fmt::Display for NotFound {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("not found")
        }
    }

    impl std::error::Error for NotFound {}

    fn click() -> &'static OperationDescriptor {
        descriptor(TargetKind::Page, "click").unwrap()
    }

    fn setup(operation: Operation) -> (EventSink, Operation) {
        let sink = EventSink::discard();
        let instrumentor = StepInstrumentor::new(Arc::new(sink.clone()));
        let wrapped = instrumentor.wrap(operation, click());
        (sink, wrapped)
    }

    fn invoke(operation: &Operation, call: &Call) -> OperationResult {
        match &operation.body {
            Body::Blocking(f) => f(call),
            Body::Suspending(_) => panic!("expected blocking operation"),
        }
    }

    fn step_end(event: &Event) -> &StepFinish {
        match &event.kind {
            EventKind::StepEnd { step } => step,
            other => panic!("expected StepEnd, got {:?}", other),
        }
    }

    #[test]
    fn success_emits_begin_then_end() {
        let (sink, wrapped) = setup(Operation::blocking(|_| Ok(json!("clicked"))));

        let out = invoke(&wrapped, &Call::new().arg("#submit")).unwrap();
        assert_eq!(out, json!("clicked"));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].kind,
            EventKind::StepBegin {
                step: StepStart {
                    title: "page.click(#submit)".into(),
                    category: Category::Action,
                }
            }
        );
        let end = step_end(&events[1]);
        assert_eq!(end.title, "page.click(#submit)");
        assert_eq!(end.category, Some(Category::Action));
        assert!(end.duration >= 0.0);
        assert!(end.error.is_none());
    }

    #[test]
    fn failure_is_recorded_and_passed_through_unchanged() {
        let raised = Arc::new(AtomicUsize::new(0));
        let raised_in_op = Arc::clone(&raised);
        let (sink, wrapped) = setup(Operation::blocking(move |_| {
            let err: OperationError = Box::new(NotFound);
            raised_in_op.store(&*err as *const _ as *const () as usize, Ordering::SeqCst);
            Err(err)
        }));

        let err = invoke(&wrapped, &Call::new().arg("#missing")).unwrap_err();
        assert_eq!(&*err as *const _ as *const () as usize, raised.load(Ordering::SeqCst));
        assert!(err.downcast_ref::<NotFound>().is_some());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(step_end(&events[1]).error.as_deref(), Some("not found"));
    }

    #[test]
    fn wrapping_twice_is_a_no_op() {
        let (sink, wrapped) = setup(Operation::blocking(|_| Ok(Value::Null)));
        let instrumentor = StepInstrumentor::new(Arc::new(sink.clone()));
        let again = instrumentor.wrap(wrapped, click());

        assert!(again.is_instrumented());
        invoke(&again, &Call::new().arg("#a")).unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn sequential_calls_do_not_interleave() {
        let (sink, wrapped) = setup(Operation::blocking(|_| Ok(Value::Null)));
        invoke(&wrapped, &Call::new().arg("#first")).unwrap();
        invoke(&wrapped, &Call::new().arg("#second")).unwrap();

        let names: Vec<_> = sink
            .events()
            .iter()
            .map(|e| (e.kind.wire_name(), e.kind.step_title().unwrap().to_string()))
            .collect();
        assert_eq!(
            names,
            [
                ("onStepBegin", "page.click(#first)".to_string()),
                ("onStepEnd", "page.click(#first)".to_string()),
                ("onStepBegin", "page.click(#second)".to_string()),
                ("onStepEnd", "page.click(#second)".to_string()),
            ]
        );
    }

    #[test]
    fn panic_still_emits_step_end() {
        let (sink, wrapped) = setup(Operation::blocking(|_| panic!("driver crashed")));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            invoke(&wrapped, &Call::new().arg("#a"))
        }));
        assert!(outcome.is_err());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(step_end(&events[1]).error.as_deref(), Some(PANICKED));
    }

    fn suspending_api(operation: Operation, sink: &EventSink) -> AutomationApi {
        let instrumentor = StepInstrumentor::new(Arc::new(sink.clone()));
        let api = AutomationApi::new();
        api.register(
            TargetType::new(TargetKind::Page, CallingConvention::Suspending)
                .with_operation("click", instrumentor.wrap(operation, click())),
        );
        api
    }

    #[tokio::test]
    async fn suspending_success_and_failure() {
        let sink = EventSink::discard();
        let api = suspending_api(
            Operation::suspending(|call: Call| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                match call.positional(0).and_then(Value::as_str) {
                    Some("#submit") => Ok(json!(true)),
                    _ => Err(Box::new(NotFound) as OperationError),
                }
            }),
            &sink,
        );
        let page = api
            .target(CallingConvention::Suspending, TargetKind::Page)
            .unwrap();

        assert_eq!(
            page.call_async("click", Call::new().arg("#submit")).await.unwrap(),
            json!(true)
        );
        let err = page
            .call_async("click", Call::new().arg("#gone"))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<NotFound>().is_some());

        let events = sink.events();
        assert_eq!(events.len(), 4);
        let first = step_end(&events[1]);
        assert!(first.error.is_none());
        assert!(first.duration >= 5.0);
        assert_eq!(step_end(&events[3]).error.as_deref(), Some("not found"));
    }

    #[tokio::test]
    async fn cancelled_future_emits_step_end() {
        let sink = EventSink::discard();
        let api = suspending_api(
            Operation::suspending(|_call: Call| futures::future::pending::<OperationResult>()),
            &sink,
        );
        let page = api
            .target(CallingConvention::Suspending, TargetKind::Page)
            .unwrap();

        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            page.call_async("click", Call::new().arg("#spinner")),
        )
        .await;
        assert!(timed_out.is_err());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(step_end(&events[1]).error.as_deref(), Some(CANCELLED));
    }
}
