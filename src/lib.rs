//! pw-reporter - step-level event reporting for browser automation tests
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      BOUNDARIES                              │
//! │  surface/    automation API: targets, operations, calls      │
//! │  lifecycle/  test-runner hook contract + bridge              │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      INSTRUMENTATION                         │
//! │  instrument/ descriptor tables, titles, wrapper, installer   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      EVENT STREAM                            │
//! │  event/      Event, EventKind, EventSink (NDJSON writer)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`surface`] | Target types and operations of the automation library |
//! | [`instrument`] | Wrap catalogued operations with begin/end step events |
//! | [`lifecycle`] | Forward runner notifications as run/test events |
//! | [`event`] | Timestamp, store and write the single ordered stream |
//! | [`reporter`] | Process-scoped bundle built from [`config`] |
//! | [`error`] | Error types with fix suggestions |

// ═══════════════════════════════════════════════════════════════
// BOUNDARIES
// ═══════════════════════════════════════════════════════════════
pub mod lifecycle;
pub mod surface;

// ═══════════════════════════════════════════════════════════════
// INSTRUMENTATION + EVENT STREAM
// ═══════════════════════════════════════════════════════════════
pub mod event;
pub mod instrument;
pub mod reporter;

// ═══════════════════════════════════════════════════════════════
// AMBIENT
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;
pub mod logging;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod testing;

pub use config::{OutputTarget, ReporterConfig};
pub use error::{FixSuggestion, ReporterError, Result};
pub use event::{
    Category, Event, EventEmitter, EventKind, EventSink, NoopEmitter, RunInfo, RunSummary,
    StepFinish, StepStart, TestLocation, WireFormat,
};
pub use instrument::{Installer, OperationDescriptor, PatchRegistry, StepInstrumentor, TitleRule};
pub use lifecycle::{LifecycleBridge, PhaseFailure, RunnerHooks, TestPhase, TestReport};
pub use reporter::Reporter;
pub use surface::{
    AutomationApi, Call, CallingConvention, Describe, Operation, OperationError,
    OperationResult, TargetKind, TargetRef, TargetType,
};
