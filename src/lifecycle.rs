//! Lifecycle Bridge - forwards test-runner notifications into the event stream
//!
//! The runner calls [`RunnerHooks`] at fixed points; [`LifecycleBridge`]
//! translates each call into events without filtering, aggregating or
//! reordering. Runner-supplied values are passed through verbatim.
//!
//! Per test item the runner is trusted to call:
//! `test_started` → (steps) → `test_reported` for setup/call/teardown.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::event::{
    EventEmitter, EventKind, ResultInfo, RunInfo, RunSummary, StepFinish, TestLocation, TestRef,
    TestResult,
};

/// Phase of the runner's per-test protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestPhase {
    Setup,
    Call,
    Teardown,
}

impl TestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Call => "call",
            Self::Teardown => "teardown",
        }
    }
}

/// Report the runner produces for each phase of a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub nodeid: String,
    pub when: TestPhase,
    /// Runner-defined outcome (`passed`, `failed`, `skipped`, ...)
    pub outcome: String,
    /// Seconds
    pub duration: f64,
    /// Textual failure representation, if any
    pub longrepr: Option<String>,
}

impl TestReport {
    pub fn failed(&self) -> bool {
        self.outcome == "failed"
    }
}

/// Exception captured while building a phase report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseFailure {
    pub nodeid: String,
    pub when: TestPhase,
    /// Seconds
    pub duration: f64,
    pub error: String,
}

/// Notification contract between the test runner and the reporter
pub trait RunnerHooks: Send + Sync {
    /// Session created
    fn run_started(&self, run: &RunInfo);

    /// Whole run finished
    fn run_finished(&self, summary: &RunSummary);

    /// Runtest protocol starts for one item
    fn test_started(&self, test_id: &str, location: &TestLocation);

    /// Report produced for one phase of one item
    fn test_reported(&self, report: &TestReport);

    /// A phase raised while its report was being made
    ///
    /// Unlike the other hooks this may emit nothing: the bridge only turns
    /// it into an `onStepEnd` when the phase-failure channel is enabled.
    fn phase_failed(&self, _failure: &PhaseFailure) {}
}

/// Translates runner notifications into events
#[derive(Clone)]
pub struct LifecycleBridge {
    emitter: Arc<dyn EventEmitter>,
    phase_failures: bool,
}

impl LifecycleBridge {
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            emitter,
            phase_failures: false,
        }
    }

    /// Also report failing phases as standalone `onStepEnd` records
    pub fn with_phase_failures(mut self, enabled: bool) -> Self {
        self.phase_failures = enabled;
        self
    }
}

impl RunnerHooks for LifecycleBridge {
    fn run_started(&self, run: &RunInfo) {
        self.emitter.emit(EventKind::RunBegin(run.clone()));
    }

    fn run_finished(&self, summary: &RunSummary) {
        self.emitter.emit(EventKind::RunEnd(summary.clone()));
    }

    fn test_started(&self, test_id: &str, location: &TestLocation) {
        self.emitter.emit(EventKind::TestBegin {
            test: TestRef {
                id: test_id.to_string(),
                location: location.clone(),
            },
        });
    }

    fn test_reported(&self, report: &TestReport) {
        if report.when != TestPhase::Call {
            return;
        }
        self.emitter.emit(EventKind::TestEnd {
            test: TestResult {
                id: report.nodeid.clone(),
                outcome: report.outcome.clone(),
                duration: report.duration,
            },
            result: ResultInfo {
                status: report.outcome.clone(),
                duration: report.duration,
            },
        });
        if report.failed() {
            self.emitter.emit(EventKind::TestError {
                error: report.longrepr.clone(),
            });
        }
    }

    fn phase_failed(&self, failure: &PhaseFailure) {
        if !self.phase_failures {
            return;
        }
        self.emitter.emit(EventKind::StepEnd {
            step: StepFinish {
                title: failure.when.as_str().to_string(),
                category: None,
                duration: failure.duration * 1000.0,
                error: Some(failure.error.clone()),
            },
        });
    }
}

impl std::fmt::Debug for LifecycleBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleBridge")
            .field("phase_failures", &self.phase_failures)
            .finish_non_exhaustive()
    }
}
