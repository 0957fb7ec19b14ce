//! Automation API surface
//!
//! The boundary to the browser-automation library. A binding registers one
//! [`TargetType`] per (calling convention, target kind) it provides; test
//! code invokes operations through a [`TargetRef`]. Operations are looked up
//! at call time, so replacing one (as the installer does) affects every
//! later call made through any handle.
//!
//! ```rust
//! use pw_reporter::surface::{
//!     AutomationApi, Call, CallingConvention, Operation, TargetKind, TargetType,
//! };
//! use serde_json::json;
//!
//! let api = AutomationApi::new();
//! api.register(
//!     TargetType::new(TargetKind::Page, CallingConvention::Blocking)
//!         .with_operation("title", Operation::blocking(|_| Ok(json!("Home")))),
//! );
//!
//! let page = api.target(CallingConvention::Blocking, TargetKind::Page).unwrap();
//! assert_eq!(page.call("title", &Call::new()).unwrap(), json!("Home"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::ReporterError;

/// Error raised by an automation operation, passed through untouched
pub type OperationError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type OperationResult = std::result::Result<Value, OperationError>;

pub(crate) type BlockingFn = Arc<dyn Fn(&Call) -> OperationResult + Send + Sync>;
pub(crate) type SuspendingFn =
    Arc<dyn Fn(Call) -> BoxFuture<'static, OperationResult> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════
// Target identity
// ═══════════════════════════════════════════════════════════════

/// Class of interactive object whose operations can be instrumented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    Page,
    Locator,
    Assertions,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [Self::Page, Self::Locator, Self::Assertions];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Locator => "locator",
            Self::Assertions => "assertions",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operation blocks its caller or suspends cooperatively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallingConvention {
    Blocking,
    Suspending,
}

impl CallingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Suspending => "suspending",
        }
    }

    fn other(&self) -> Self {
        match self {
            Self::Blocking => Self::Suspending,
            Self::Suspending => Self::Blocking,
        }
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════
// Calls
// ═══════════════════════════════════════════════════════════════

/// Capability of a receiver to describe itself in step titles
///
/// Locators and assertion helpers implement this to return their selector.
/// Receivers without a useful description keep the default.
pub trait Describe: Send + Sync {
    fn describe(&self) -> Option<String> {
        None
    }
}

/// Receiver that offers no description
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Describe for Anonymous {}

/// A selector string describes itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(pub String);

impl Describe for Selector {
    fn describe(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// One invocation: receiver plus positional and keyword arguments
#[derive(Clone)]
pub struct Call {
    receiver: Arc<dyn Describe>,
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl Call {
    /// Call on a receiver that does not describe itself
    pub fn new() -> Self {
        Self::on(Arc::new(Anonymous))
    }

    pub fn on(receiver: Arc<dyn Describe>) -> Self {
        Self {
            receiver,
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Shorthand for a call on a [`Selector`] receiver
    pub fn on_selector(selector: impl Into<String>) -> Self {
        Self::on(Arc::new(Selector(selector.into())))
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn receiver(&self) -> &dyn Describe {
        self.receiver.as_ref()
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }
}

impl Default for Call {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("receiver", &self.receiver.describe())
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════════════════════════

#[derive(Clone)]
pub(crate) enum Body {
    Blocking(BlockingFn),
    Suspending(SuspendingFn),
}

/// Callable implementation of one named operation
#[derive(Clone)]
pub struct Operation {
    pub(crate) body: Body,
    pub(crate) instrumented: bool,
}

impl Operation {
    pub fn blocking(f: impl Fn(&Call) -> OperationResult + Send + Sync + 'static) -> Self {
        Self {
            body: Body::Blocking(Arc::new(f)),
            instrumented: false,
        }
    }

    pub fn suspending<F, Fut>(f: F) -> Self
    where
        F: Fn(Call) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        Self {
            body: Body::Suspending(Arc::new(move |call| f(call).boxed())),
            instrumented: false,
        }
    }

    pub fn convention(&self) -> CallingConvention {
        match self.body {
            Body::Blocking(_) => CallingConvention::Blocking,
            Body::Suspending(_) => CallingConvention::Suspending,
        }
    }

    /// True once the operation has been wrapped by the step instrumentor
    pub fn is_instrumented(&self) -> bool {
        self.instrumented
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("convention", &self.convention())
            .field("instrumented", &self.instrumented)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════
// Target types
// ═══════════════════════════════════════════════════════════════

/// Operation catalogue of one target kind in one calling convention
#[derive(Clone, Debug)]
pub struct TargetType {
    kind: TargetKind,
    convention: CallingConvention,
    operations: HashMap<String, Operation>,
}

impl TargetType {
    pub fn new(kind: TargetKind, convention: CallingConvention) -> Self {
        Self {
            kind,
            convention,
            operations: HashMap::new(),
        }
    }

    pub fn with_operation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.define(name, operation);
        self
    }

    pub fn define(&mut self, name: impl Into<String>, operation: Operation) {
        self.operations.insert(name.into(), operation);
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Swap in a new implementation for an existing operation
    ///
    /// Returns the previous implementation, or `None` (and changes nothing)
    /// if the operation is not defined.
    pub fn replace(&mut self, name: &str, operation: Operation) -> Option<Operation> {
        self.operations
            .get_mut(name)
            .map(|slot| std::mem::replace(slot, operation))
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

type TargetKey = (CallingConvention, TargetKind);

/// Registry of the target types an automation library provides
///
/// Cloning shares the underlying registry. An `AutomationApi` with nothing
/// registered stands for a library that is not available.
#[derive(Clone, Default)]
pub struct AutomationApi {
    targets: Arc<RwLock<HashMap<TargetKey, TargetType>>>,
}

impl AutomationApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) a target type
    pub fn register(&self, target: TargetType) {
        let key = (target.convention, target.kind);
        self.targets.write().insert(key, target);
    }

    pub fn has_target(&self, convention: CallingConvention, kind: TargetKind) -> bool {
        self.targets.read().contains_key(&(convention, kind))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }

    /// Handle for invoking operations, if the target type is provided
    pub fn target(&self, convention: CallingConvention, kind: TargetKind) -> Option<TargetRef> {
        self.has_target(convention, kind).then(|| TargetRef {
            api: self.clone(),
            key: (convention, kind),
        })
    }

    /// Whether an operation is currently wrapped (`None` if absent)
    pub fn is_instrumented(
        &self,
        convention: CallingConvention,
        kind: TargetKind,
        name: &str,
    ) -> Option<bool> {
        self.targets
            .read()
            .get(&(convention, kind))
            .and_then(|target| target.operation(name))
            .map(Operation::is_instrumented)
    }

    /// Run `f` with exclusive access to one target type
    pub(crate) fn patch<T>(
        &self,
        convention: CallingConvention,
        kind: TargetKind,
        f: impl FnOnce(&mut TargetType) -> T,
    ) -> Option<T> {
        self.targets.write().get_mut(&(convention, kind)).map(f)
    }

    fn operation(&self, key: TargetKey, name: &str) -> Result<Operation, ReporterError> {
        self.targets
            .read()
            .get(&key)
            .and_then(|target| target.operation(name))
            .cloned()
            .ok_or_else(|| ReporterError::UnknownOperation {
                target: key.1,
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for AutomationApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<TargetKey> = self.targets.read().keys().copied().collect();
        keys.sort();
        f.debug_struct("AutomationApi").field("targets", &keys).finish()
    }
}

/// Invocation handle for one target type
#[derive(Clone, Debug)]
pub struct TargetRef {
    api: AutomationApi,
    key: TargetKey,
}

impl TargetRef {
    pub fn kind(&self) -> TargetKind {
        self.key.1
    }

    pub fn convention(&self) -> CallingConvention {
        self.key.0
    }

    /// Invoke a blocking operation
    pub fn call(&self, name: &str, call: &Call) -> OperationResult {
        let operation = self.api.operation(self.key, name)?;
        match &operation.body {
            Body::Blocking(f) => f(call),
            Body::Suspending(_) => Err(self.mismatch(name, CallingConvention::Blocking).into()),
        }
    }

    /// Invoke a suspending operation
    pub async fn call_async(&self, name: &str, call: Call) -> OperationResult {
        let operation = self.api.operation(self.key, name)?;
        match &operation.body {
            Body::Suspending(f) => f(call).await,
            Body::Blocking(_) => Err(self.mismatch(name, CallingConvention::Suspending).into()),
        }
    }

    fn mismatch(&self, name: &str, expected: CallingConvention) -> ReporterError {
        ReporterError::ConventionMismatch {
            target: self.key.1,
            name: name.to_string(),
            expected,
            actual: expected.other(),
        }
    }
}
