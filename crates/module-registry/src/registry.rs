//! # Module Registry & Resolver
//!
//! This module defines [`ModuleRegistry`], the kernel every feature module registers with
//! and is resolved through. It owns the entries, runs the resolver and drives teardown.
//!
//! ## Resolution
//!
//! Modules are constructed lazily. Requesting a module ([`ModuleRegistry::get_module`])
//! recursively resolves each declared dependency first, then invokes the factory with a
//! fully populated [`Dependencies`] map:
//!
//! 1. External singleton: returned as is.
//! 2. `Initialized`: the cached instance is returned, the factory is not called again.
//! 3. `Initializing`: the module is being resolved further up the stack, so this request
//!    closes a cycle. The module is marked `Failed` with a circular dependency error.
//! 4. `Failed`: nothing is retried within the same registration.
//! 5. `Registered`: dependencies are resolved (all of them, so the error lists every
//!    unresolved name), then the factory runs.
//!
//! Resolution is single threaded and depth first; the `Initializing` status acts as the
//! guard that prevents a second construction.
//!
//! ## Containment
//!
//! Nothing a module does escapes as an error or a panic. Factory errors, `None` results
//! and panics are all recorded on the entry as a [`ModuleError`] and the caller sees `None`.
//! Dependents of a failed module fail in turn.

use crate::entry::{ModuleEntry, ModuleInfo};
use crate::error::{panic_message, ModuleError};
use crate::graph::{self, DependencyGraph, ValidationReport};
use crate::module::{Dependencies, FactoryResult, ModuleInstance, ModuleStatus};
use crate::stats::{as_millis_f64, InitSummary, RegistryStats, Tracker};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// The module lifecycle manager.
///
/// Construct one explicitly at the composition root and pass it to whatever loads the
/// feature modules; there is no global instance.
///
/// ```rust
/// use module_registry::{ModuleInstance, ModuleRegistry};
///
/// struct Ui {
///     greeting: String,
/// }
///
/// let mut registry = ModuleRegistry::new();
/// assert!(registry.register("dom", |_| Ok(Some(ModuleInstance::new("<body>"))), &[]));
/// assert!(registry.register(
///     "ui",
///     |deps| {
///         let dom = deps.require::<&str>("dom")?;
///         Ok(Some(ModuleInstance::new(Ui { greeting: format!("hello from {}", dom) })))
///     },
///     &["dom"],
/// ));
///
/// let ui = registry.get_module("ui").unwrap();
/// assert_eq!(ui.downcast_ref::<Ui>().unwrap().greeting, "hello from <body>");
/// assert!(registry.is_module_ready("dom"));
///
/// registry.cleanup();
/// assert!(!registry.is_module_ready("ui"));
/// ```
pub struct ModuleRegistry {
    entries: IndexMap<String, ModuleEntry>,
    externals: IndexMap<String, ModuleInstance>,
    tracker: Tracker,
    /// Names currently being resolved, outermost first. Only used to describe cycles.
    resolving: Vec<String>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            externals: IndexMap::new(),
            tracker: Tracker::default(),
            resolving: Vec::new(),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Installs an externally created singleton that modules may depend on by `name`.
    ///
    /// Externals are always available, are never constructed or torn down by the registry,
    /// and are not reported as missing by [`validate_dependencies`](Self::validate_dependencies).
    pub fn provide_external(&mut self, name: impl Into<String>, instance: ModuleInstance) {
        let name = name.into();
        if self.entries.contains_key(&name) {
            warn!(module = %name, "External singleton shadows a registered module");
        }
        debug!(module = %name, "External provided");
        self.externals.insert(name, instance);
    }

    /// Registers a module factory and its dependencies.
    ///
    /// Returns `true` when every dependency is available: an external, or a registered
    /// module that is not deferred, failed or torn down. A module may list itself, which
    /// is left for resolution to report as a cycle. Otherwise the entry is still stored,
    /// its missing dependencies are recorded as pending, and `false` is returned: the
    /// caller is expected to register again once the dependencies exist.
    ///
    /// Registering an existing name replaces the previous entry with a warning. If the
    /// previous module was initialized, it and every initialized module depending on it
    /// are torn down first (see [`cleanup`](Self::cleanup)), and those dependents go back to
    /// `Registered` so the next request rebuilds them against the new instance. The
    /// factory is never invoked here.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F, dependencies: &[&str]) -> bool
    where
        F: Fn(&Dependencies) -> FactoryResult + Send + Sync + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            error!("Rejected registration with an empty module name");
            return false;
        }

        let dependencies: Vec<String> = dependencies.iter().map(|dep| dep.to_string()).collect();
        let pending: Vec<String> = dependencies
            .iter()
            .filter(|dep| **dep != name && !self.is_available(dep))
            .cloned()
            .collect();

        if let Some(previous) = self.entries.get(&name).map(|entry| entry.status) {
            warn!(
                module = %name,
                previous_status = %previous,
                "Module already registered, overwriting"
            );
            self.retire(&name);
        }

        let ready = pending.is_empty();
        if ready {
            info!(module = %name, ?dependencies, "Registered");
            self.tracker.record_registration();
        } else {
            info!(module = %name, ?pending, "Registration deferred until dependencies are registered");
        }

        let entry = ModuleEntry::new(name.clone(), Box::new(factory), dependencies, pending);
        self.entries.insert(name, entry);
        ready
    }

    /// Returns the module instance, initializing it and its dependencies on first use.
    ///
    /// `None` means the module is unknown, failed (now or earlier), or torn down; the
    /// reason is available through [`module_info`](Self::module_info).
    pub fn get_module(&mut self, name: &str) -> Option<ModuleInstance> {
        if let Some(external) = self.externals.get(name) {
            return Some(external.clone());
        }
        if let Some(entry) = self.entries.get(name) {
            if let (ModuleStatus::Initialized, Some(instance)) = (entry.status, &entry.instance) {
                debug!(module = name, "Cache hit");
                return Some(instance.clone());
            }
        }
        self.initialize(name)
    }

    /// Runs the initialization state machine for `name`. See the [module docs](self).
    ///
    /// A deferred entry is not refused here: its dependencies are checked against the
    /// current registry like any other, and it fails if they still cannot be resolved.
    pub fn initialize(&mut self, name: &str) -> Option<ModuleInstance> {
        let Some(entry) = self.entries.get_mut(name) else {
            error!(module = name, "Unknown module requested");
            return None;
        };

        let status = entry.status;
        match status {
            ModuleStatus::Registered => {}
            ModuleStatus::Initialized => return entry.instance.clone(),
            ModuleStatus::Initializing => {
                let chain = self.cycle_chain(name);
                self.fail(
                    name,
                    ModuleError::CircularDependency {
                        module: name.to_string(),
                        chain,
                    },
                );
                return None;
            }
            ModuleStatus::Failed => {
                debug!(module = name, "Previously failed, not retrying");
                return None;
            }
            status @ (ModuleStatus::CleaningUp | ModuleStatus::Destroyed) => {
                warn!(module = name, %status, "Module was torn down, register it again to use it");
                return None;
            }
        }

        entry.status = ModuleStatus::Initializing;
        let declared = entry.dependencies.clone();

        self.resolving.push(name.to_string());
        let mut resolved = Dependencies::default();
        let mut unresolved = Vec::new();
        for dependency in declared {
            match self.get_module(&dependency) {
                Some(instance) => {
                    debug!(module = name, dependency = %dependency, "Dependency resolved");
                    resolved.insert(dependency, instance);
                }
                None => unresolved.push(dependency),
            }
        }
        self.resolving.pop();

        // A nested frame may already have failed this module (it closed a cycle).
        if self.status(name) == Some(ModuleStatus::Failed) {
            return None;
        }
        if !unresolved.is_empty() {
            self.fail(
                name,
                ModuleError::DependencyResolution {
                    module: name.to_string(),
                    unresolved,
                },
            );
            return None;
        }

        self.construct(name, &resolved)
    }

    /// Resolves every registered module, in registration order. Never fails.
    pub fn initialize_all(&mut self) -> InitSummary {
        let started = Instant::now();
        let names: Vec<String> = self.entries.keys().cloned().collect();
        let total = names.len();

        let mut successful = 0;
        for name in &names {
            if self.get_module(name).is_some() {
                successful += 1;
            }
        }

        let summary = InitSummary {
            successful,
            total,
            time_ms: as_millis_f64(started.elapsed()),
        };
        if summary.all_succeeded() {
            info!(successful, total, time_ms = summary.time_ms, "All modules initialized");
        } else {
            warn!(successful, total, time_ms = summary.time_ms, "Some modules failed to initialize");
        }
        summary
    }

    /// Tears down every initialized module in reverse initialization order.
    ///
    /// Each module goes `CleaningUp -> Destroyed`; its [`Disposable`](crate::Disposable) hook,
    /// if any, runs in between. A failing hook is logged and teardown carries on. Afterwards
    /// the load order and error index are empty, and the same names can be registered again.
    pub fn cleanup(&mut self) {
        let load_order = self.tracker.take_load_order();
        info!(modules = load_order.len(), "Cleaning up modules");

        for name in load_order.iter().rev() {
            let Some(entry) = self.entries.get_mut(name) else {
                continue;
            };
            let Some(instance) = entry.instance.take() else {
                continue;
            };

            entry.status = ModuleStatus::CleaningUp;
            if let Err(e) = run_teardown(name, &instance) {
                warn!(module = %name, error = %e, "Teardown failed, continuing");
            }
            entry.status = ModuleStatus::Destroyed;
            entry.init_time = None;
            debug!(module = %name, "Destroyed");
        }

        self.tracker.clear_indices();
        info!("Cleanup complete");
    }

    pub fn module_info(&self, name: &str) -> Option<ModuleInfo> {
        self.entries.get(name).map(ModuleEntry::info)
    }

    /// Diagnostic records for every registered module, in registration order.
    pub fn modules_info(&self) -> Vec<ModuleInfo> {
        self.entries.values().map(ModuleEntry::info).collect()
    }

    /// `true` if `name` is initialized (or is an external singleton).
    pub fn is_module_ready(&self, name: &str) -> bool {
        self.externals.contains_key(name) || self.status(name) == Some(ModuleStatus::Initialized)
    }

    pub fn status(&self, name: &str) -> Option<ModuleStatus> {
        self.entries.get(name).map(|entry| entry.status)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        graph::build(&self.entries)
    }

    pub fn validate_dependencies(&self) -> ValidationReport {
        graph::validate(&self.entries, |name| self.externals.contains_key(name))
    }

    pub fn stats(&self) -> &RegistryStats {
        self.tracker.stats()
    }

    /// Names in the order they reached `Initialized`.
    pub fn load_order(&self) -> &[String] {
        self.tracker.load_order()
    }

    /// Last recorded failure per module.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &ModuleError)> {
        self.tracker.errors()
    }

    fn is_available(&self, name: &str) -> bool {
        if self.externals.contains_key(name) {
            return true;
        }
        self.entries.get(name).is_some_and(|entry| {
            entry.pending_dependencies.is_empty()
                && matches!(
                    entry.status,
                    ModuleStatus::Registered | ModuleStatus::Initializing | ModuleStatus::Initialized
                )
        })
    }

    /// Tears down `name` and every initialized module that transitively depends on it,
    /// dependents first, and drops them from the indices. Dependents go back to `Registered`.
    fn retire(&mut self, name: &str) {
        let graph = graph::build(&self.entries);
        let mut affected: HashSet<String> = HashSet::new();
        let mut queue = vec![name.to_string()];
        while let Some(current) = queue.pop() {
            if !affected.contains(current.as_str()) {
                queue.extend(graph.dependents_of(&current).iter().cloned());
                affected.insert(current);
            }
        }

        let doomed: Vec<String> = self
            .tracker
            .load_order()
            .iter()
            .rev()
            .filter(|loaded| affected.contains(loaded.as_str()))
            .cloned()
            .collect();

        for loaded in &doomed {
            let Some(entry) = self.entries.get_mut(loaded) else {
                continue;
            };
            let Some(instance) = entry.instance.take() else {
                continue;
            };

            entry.status = ModuleStatus::CleaningUp;
            if let Err(e) = run_teardown(loaded, &instance) {
                warn!(module = %loaded, error = %e, "Teardown failed, continuing");
            }
            entry.status = ModuleStatus::Registered;
            entry.init_time = None;
            if loaded != name {
                warn!(module = %loaded, dependency = name, "Dependency replaced, module will be rebuilt");
            }
            self.tracker.forget(loaded);
        }
        self.tracker.forget(name);
    }

    fn cycle_chain(&self, name: &str) -> Vec<String> {
        let start = self
            .resolving
            .iter()
            .position(|resolving| resolving == name)
            .unwrap_or(self.resolving.len());
        let mut chain = self.resolving[start..].to_vec();
        chain.push(name.to_string());
        chain
    }

    fn construct(&mut self, name: &str, resolved: &Dependencies) -> Option<ModuleInstance> {
        let entry = self.entries.get(name)?;

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (entry.factory)(resolved)));
        let elapsed = started.elapsed();

        let module = name.to_string();
        match outcome {
            Ok(Ok(Some(instance))) => {
                self.complete(name, instance.clone(), elapsed);
                Some(instance)
            }
            Ok(Ok(None)) => {
                self.fail(name, ModuleError::NoInstance { module });
                None
            }
            Ok(Err(source)) => {
                let source = Arc::from(source);
                self.fail(name, ModuleError::Factory { module, source });
                None
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.fail(name, ModuleError::FactoryPanicked { module, message });
                None
            }
        }
    }

    fn complete(&mut self, name: &str, instance: ModuleInstance, elapsed: Duration) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.status = ModuleStatus::Initialized;
            entry.instance = Some(instance);
            entry.init_time = Some(elapsed);
            entry.error = None;
        }
        self.tracker.record_success(name, elapsed);
        info!(module = name, elapsed_ms = as_millis_f64(elapsed), "Initialized");
    }

    fn fail(&mut self, name: &str, error: ModuleError) {
        warn!(module = name, error = %error, "Initialization failed");
        if let Some(entry) = self.entries.get_mut(name) {
            entry.status = ModuleStatus::Failed;
            entry.instance = None;
            entry.error = Some(error.clone());
        }
        self.tracker.record_failure(name, error);
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("entries", &self.entries.values().collect::<Vec<_>>())
            .field("externals", &self.externals.keys().collect::<Vec<_>>())
            .field("load_order", &self.tracker.load_order())
            .finish()
    }
}

fn run_teardown(name: &str, instance: &ModuleInstance) -> Result<(), ModuleError> {
    let Some(hook) = instance.teardown_hook() else {
        return Ok(());
    };
    let message = match panic::catch_unwind(AssertUnwindSafe(|| hook.dispose())) {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    Err(ModuleError::Teardown {
        module: name.to_string(),
        message,
    })
}

/// Configures a [`ModuleRegistry`] before any module registers.
#[derive(Default)]
pub struct RegistryBuilder {
    externals: IndexMap<String, ModuleInstance>,
}

impl RegistryBuilder {
    /// Adds an external singleton (see [`ModuleRegistry::provide_external`]).
    pub fn external(mut self, name: impl Into<String>, instance: ModuleInstance) -> Self {
        self.externals.insert(name.into(), instance);
        self
    }

    pub fn build(self) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        for (name, instance) in self.externals {
            registry.provide_external(name, instance);
        }
        registry
    }
}
