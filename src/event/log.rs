//! Event model - what goes on the wire
//!
//! - Event: envelope with timestamp + kind
//! - EventKind: 7 variants across 3 levels (run/test/step)
//! - payload structs pass runner-supplied values through verbatim

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════
// Step payloads
// ═══════════════════════════════════════════════════════════════

/// Reporting category of an instrumented operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Navigation,
    Action,
    Wait,
    Assertion,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Action => "action",
            Self::Wait => "wait",
            Self::Assertion => "assertion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `onStepBegin`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepStart {
    pub title: String,
    pub category: Category,
}

/// Payload of `onStepEnd`
///
/// `category` is only absent on phase-failure records emitted by the
/// lifecycle bridge; instrumented steps always carry one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepFinish {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Elapsed wall-clock time (ms)
    pub duration: f64,
    #[serde(default)]
    pub error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════
// Run / test payloads
// ═══════════════════════════════════════════════════════════════

/// Payload of `onBegin`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunInfo {
    pub rootdir: String,
    pub args: Vec<String>,
}

/// Payload of `onEnd`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub exitstatus: i32,
    pub testsfailed: u64,
    pub testscollected: u64,
}

/// Where a test item is defined
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestLocation {
    pub file: String,
    pub line: Option<u32>,
    pub name: String,
}

/// `test` object of `onTestBegin`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestRef {
    pub id: String,
    pub location: TestLocation,
}

/// `test` object of `onTestEnd`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub id: String,
    pub outcome: String,
    /// Seconds, as reported by the runner
    pub duration: f64,
}

/// `result` object of `onTestEnd`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultInfo {
    pub status: String,
    pub duration: f64,
}

// ═══════════════════════════════════════════════════════════════
// Envelope
// ═══════════════════════════════════════════════════════════════

/// All possible event types (3 levels)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // RUN LEVEL
    // ═══════════════════════════════════════════
    #[serde(rename = "onBegin")]
    RunBegin(RunInfo),
    #[serde(rename = "onEnd")]
    RunEnd(RunSummary),

    // ═══════════════════════════════════════════
    // TEST LEVEL
    // ═══════════════════════════════════════════
    #[serde(rename = "onTestBegin")]
    TestBegin { test: TestRef },
    #[serde(rename = "onTestEnd")]
    TestEnd { test: TestResult, result: ResultInfo },
    #[serde(rename = "onError")]
    TestError { error: Option<String> },

    // ═══════════════════════════════════════════
    // STEP LEVEL (instrumented operations)
    // ═══════════════════════════════════════════
    #[serde(rename = "onStepBegin")]
    StepBegin { step: StepStart },
    #[serde(rename = "onStepEnd")]
    StepEnd { step: StepFinish },
}

impl EventKind {
    /// Name used in the `event` field of the wire record
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::RunBegin(_) => "onBegin",
            Self::RunEnd(_) => "onEnd",
            Self::TestBegin { .. } => "onTestBegin",
            Self::TestEnd { .. } => "onTestEnd",
            Self::TestError { .. } => "onError",
            Self::StepBegin { .. } => "onStepBegin",
            Self::StepEnd { .. } => "onStepEnd",
        }
    }

    /// Extract the test id if the event carries one
    pub fn test_id(&self) -> Option<&str> {
        match self {
            Self::TestBegin { test } => Some(&test.id),
            Self::TestEnd { test, .. } => Some(&test.id),
            _ => None,
        }
    }

    /// Step title for step-level events
    pub fn step_title(&self) -> Option<&str> {
        match self {
            Self::StepBegin { step } => Some(&step.title),
            Self::StepEnd { step } => Some(&step.title),
            _ => None,
        }
    }

    /// Check if this is a runner lifecycle event (not an instrumented step)
    pub fn is_lifecycle_event(&self) -> bool {
        !matches!(self, Self::StepBegin { .. } | Self::StepEnd { .. })
    }
}

/// Single record of the event stream
///
/// The timestamp is assigned by [`EventSink`](super::EventSink), never by
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Local>,
}
