//! Instrumentation Installer
//!
//! Applies the descriptor tables to every target type the automation API
//! provides, in both calling conventions. Installation runs once per
//! installer; the patch registry guarantees no operation is wrapped twice
//! even when several installers share it.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;

use super::catalog::operations_for;
use super::step::StepInstrumentor;
use crate::event::{Category, EventEmitter};
use crate::surface::{AutomationApi, CallingConvention, TargetKind};

/// Identity of one wrapped operation
pub type PatchKey = (CallingConvention, TargetKind, &'static str);

/// Conventions in installation order
const CONVENTIONS: [CallingConvention; 2] =
    [CallingConvention::Suspending, CallingConvention::Blocking];

/// Record of every operation that has been wrapped
///
/// Created empty; the map itself is allocated on the first claim and never
/// reset.
#[derive(Debug, Default)]
pub struct PatchRegistry {
    entries: OnceCell<DashMap<PatchKey, Category>>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> &DashMap<PatchKey, Category> {
        self.entries.get_or_init(DashMap::new)
    }

    /// Claim `key` for wrapping; `false` if someone already did
    pub fn claim(&self, key: PatchKey, category: Category) -> bool {
        match self.entries().entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(category);
                true
            }
        }
    }

    pub fn contains(&self, key: &PatchKey) -> bool {
        self.entries
            .get()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    pub fn category(&self, key: &PatchKey) -> Option<Category> {
        self.entries
            .get()
            .and_then(|entries| entries.get(key).map(|c| *c))
    }

    /// All claimed keys, sorted
    pub fn patched(&self) -> Vec<PatchKey> {
        let mut keys: Vec<PatchKey> = self
            .entries
            .get()
            .map(|entries| entries.iter().map(|e| *e.key()).collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.get().map(DashMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any installation has touched this registry yet
    pub fn is_initialized(&self) -> bool {
        self.entries.get().is_some()
    }
}

/// Installs step instrumentation on an automation API
pub struct Installer {
    api: AutomationApi,
    instrumentor: StepInstrumentor,
    registry: Arc<PatchRegistry>,
    installed: OnceCell<usize>,
}

impl Installer {
    pub fn new(api: AutomationApi, emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            api,
            instrumentor: StepInstrumentor::new(emitter),
            registry: Arc::new(PatchRegistry::new()),
            installed: OnceCell::new(),
        }
    }

    /// Share a registry with other installers of the same process
    pub fn with_registry(mut self, registry: Arc<PatchRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Install instrumentation (effectful on the first call only)
    ///
    /// Never fails: missing target types and operations are skipped.
    /// Concurrent callers wait for the first installation to finish.
    pub fn install(&self) {
        self.installed.get_or_init(|| self.install_all());
    }

    pub fn is_installed(&self) -> bool {
        self.installed.get().is_some()
    }

    /// Number of operations wrapped by this installer (0 before install)
    pub fn wrapped_count(&self) -> usize {
        self.installed.get().copied().unwrap_or(0)
    }

    pub fn registry(&self) -> &PatchRegistry {
        &self.registry
    }

    fn install_all(&self) -> usize {
        let mut wrapped = 0;
        for convention in CONVENTIONS {
            for kind in TargetKind::ALL {
                match self.install_target(convention, kind) {
                    Some(count) => wrapped += count,
                    None => {
                        tracing::debug!(%convention, %kind, "Target type not available, skipping")
                    }
                }
            }
        }
        tracing::info!(wrapped, "Step instrumentation installed");
        wrapped
    }

    fn install_target(&self, convention: CallingConvention, kind: TargetKind) -> Option<usize> {
        self.api.patch(convention, kind, |target| {
            let mut wrapped = 0;
            for descriptor in operations_for(kind) {
                let Some(original) = target.operation(descriptor.name) else {
                    continue;
                };
                if original.is_instrumented() {
                    continue;
                }
                let key = (convention, kind, descriptor.name);
                if !self.registry.claim(key, descriptor.category) {
                    continue;
                }
                let instrumented = self.instrumentor.wrap(original.clone(), descriptor);
                target.replace(descriptor.name, instrumented);
                wrapped += 1;
            }
            wrapped
        })
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("api", &self.api)
            .field("installed", &self.is_installed())
            .field("patched", &self.registry.len())
            .finish()
    }
}
