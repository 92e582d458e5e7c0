//! Registry entries and their diagnostic view.

use crate::error::ModuleError;
use crate::module::{Factory, ModuleInstance, ModuleStatus};
use crate::stats::as_millis_f64;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// One registered module. Owned exclusively by the [`ModuleRegistry`](crate::ModuleRegistry).
pub(crate) struct ModuleEntry {
    pub(crate) name: String,
    pub(crate) factory: Factory,
    /// Declared once at registration, never mutated.
    pub(crate) dependencies: Vec<String>,
    pub(crate) status: ModuleStatus,
    /// Present only while `status == Initialized`.
    pub(crate) instance: Option<ModuleInstance>,
    pub(crate) init_time: Option<Duration>,
    /// Present only while `status == Failed`.
    pub(crate) error: Option<ModuleError>,
    /// Snapshot of dependencies missing at registration time. Not used for resolution.
    pub(crate) pending_dependencies: Vec<String>,
}

impl ModuleEntry {
    pub(crate) fn new(
        name: String,
        factory: Factory,
        dependencies: Vec<String>,
        pending_dependencies: Vec<String>,
    ) -> Self {
        Self {
            name,
            factory,
            dependencies,
            status: ModuleStatus::Registered,
            instance: None,
            init_time: None,
            error: None,
            pending_dependencies,
        }
    }

    pub(crate) fn info(&self) -> ModuleInfo {
        ModuleInfo {
            name: self.name.clone(),
            status: self.status,
            dependencies: self.dependencies.clone(),
            pending_dependencies: self.pending_dependencies.clone(),
            init_time_ms: self.init_time.map(as_millis_f64),
            error: self.error.as_ref().map(ToString::to_string),
            has_instance: self.instance.is_some(),
        }
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("status", &self.status)
            .field("has_instance", &self.instance.is_some())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Diagnostic snapshot of a single module, as returned by
/// [`module_info`](crate::ModuleRegistry::module_info).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub status: ModuleStatus,
    pub dependencies: Vec<String>,
    pub pending_dependencies: Vec<String>,
    pub init_time_ms: Option<f64>,
    pub error: Option<String>,
    pub has_instance: bool,
}
