//! Test fixtures: an in-memory automation library and a capturing writer
//!
//! Compiled for unit tests and behind the `test-fixtures` feature for
//! integration tests.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::instrument::catalog::operations_for;
use crate::surface::{
    AutomationApi, Call, CallingConvention, Operation, OperationResult, TargetKind, TargetType,
};

/// Error raised by a [`MockBrowser`] operation set up to fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

/// Operations every mock target offers beyond the reported catalogue
const EXTRA_OPERATIONS: &[(TargetKind, &str)] = &[
    (TargetKind::Page, "title"),
    (TargetKind::Locator, "count"),
];

/// In-memory automation library
///
/// Provides page, locator and assertion targets exposing the whole reported
/// catalogue (plus a few unreported operations). Each operation records
/// `"<target>.<name>"`, then either fails with a configured [`MockError`] or
/// echoes its arguments.
#[derive(Clone)]
pub struct MockBrowser {
    api: AutomationApi,
    calls: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
}

impl MockBrowser {
    /// Both calling conventions
    pub fn new() -> Self {
        Self::with_conventions(&[CallingConvention::Blocking, CallingConvention::Suspending])
    }

    pub fn blocking_only() -> Self {
        Self::with_conventions(&[CallingConvention::Blocking])
    }

    pub fn suspending_only() -> Self {
        Self::with_conventions(&[CallingConvention::Suspending])
    }

    fn with_conventions(conventions: &[CallingConvention]) -> Self {
        let browser = Self {
            api: AutomationApi::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
        };
        for &convention in conventions {
            for kind in TargetKind::ALL {
                browser.api.register(browser.target_type(kind, convention));
            }
        }
        browser
    }

    fn target_type(&self, kind: TargetKind, convention: CallingConvention) -> TargetType {
        let mut target = TargetType::new(kind, convention);
        let names = operations_for(kind).iter().map(|d| d.name).chain(
            EXTRA_OPERATIONS
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, name)| *name),
        );
        for name in names {
            target.define(name, self.operation(kind, name, convention));
        }
        target
    }

    fn operation(&self, kind: TargetKind, name: &str, convention: CallingConvention) -> Operation {
        let qualified = format!("{}.{}", kind, name);
        let calls = Arc::clone(&self.calls);
        let failures = Arc::clone(&self.failures);

        let respond = move |call: &Call| -> OperationResult {
            calls.lock().push(qualified.clone());
            if let Some(message) = failures.lock().get(&qualified) {
                return Err(Box::new(MockError(message.clone())));
            }
            Ok(json!({ "operation": qualified, "args": call.args() }))
        };

        match convention {
            CallingConvention::Blocking => Operation::blocking(respond),
            CallingConvention::Suspending => {
                Operation::suspending(move |call: Call| futures::future::ready(respond(&call)))
            }
        }
    }

    /// Handle onto the mock library
    pub fn api(&self) -> AutomationApi {
        self.api.clone()
    }

    /// Make `"<target>.<name>"` fail with `message` from now on
    pub fn fail(&self, qualified: &str, message: &str) {
        self.failures
            .lock()
            .insert(qualified.to_string(), message.to_string());
    }

    /// Every operation invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Default for MockBrowser {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared in-memory writer for inspecting what the sink wrote
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<AtomicUsize>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    /// Parse every line as one JSON record (compact format)
    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
