//! Reporter - the process-scoped bundle of sink, installer and bridge
//!
//! Build one at startup, call [`Reporter::install`] once, and hand it to the
//! test runner as its [`RunnerHooks`].
//!
//! ```rust
//! use pw_reporter::{AutomationApi, EventSink, Reporter, RunInfo, RunnerHooks};
//!
//! let reporter = Reporter::new(AutomationApi::new(), EventSink::discard());
//! reporter.install();
//! reporter.run_started(&RunInfo { rootdir: "/repo".into(), args: vec![] });
//! assert_eq!(reporter.sink().len(), 1);
//! ```

use std::sync::Arc;

use crate::config::ReporterConfig;
use crate::error::Result;
use crate::event::{EventEmitter, EventSink, RunInfo, RunSummary, TestLocation};
use crate::instrument::{Installer, PatchRegistry};
use crate::lifecycle::{LifecycleBridge, PhaseFailure, RunnerHooks, TestReport};
use crate::surface::AutomationApi;

#[derive(Debug)]
pub struct Reporter {
    sink: EventSink,
    installer: Installer,
    bridge: LifecycleBridge,
}

impl Reporter {
    pub fn new(api: AutomationApi, sink: EventSink) -> Self {
        let emitter: Arc<dyn EventEmitter> = Arc::new(sink.clone());
        Self {
            installer: Installer::new(api, Arc::clone(&emitter)),
            bridge: LifecycleBridge::new(emitter),
            sink,
        }
    }

    /// Build sink and bridge options from config
    pub fn from_config(api: AutomationApi, config: &ReporterConfig) -> Result<Self> {
        let sink = EventSink::from_config(config)?;
        let mut reporter = Self::new(api, sink);
        reporter.bridge = reporter.bridge.with_phase_failures(config.phase_failures);
        Ok(reporter)
    }

    /// Share the patch registry with other reporters of this process
    pub fn with_registry(mut self, registry: Arc<PatchRegistry>) -> Self {
        self.installer = self.installer.with_registry(registry);
        self
    }

    /// Install step instrumentation (idempotent)
    pub fn install(&self) {
        self.installer.install();
    }

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    pub fn bridge(&self) -> &LifecycleBridge {
        &self.bridge
    }
}

impl RunnerHooks for Reporter {
    fn run_started(&self, run: &RunInfo) {
        self.bridge.run_started(run)
    }

    fn run_finished(&self, summary: &RunSummary) {
        self.bridge.run_finished(summary)
    }

    fn test_started(&self, test_id: &str, location: &TestLocation) {
        self.bridge.test_started(test_id, location)
    }

    fn test_reported(&self, report: &TestReport) {
        self.bridge.test_reported(report)
    }

    fn phase_failed(&self, failure: &PhaseFailure) {
        self.bridge.phase_failed(failure)
    }
}
