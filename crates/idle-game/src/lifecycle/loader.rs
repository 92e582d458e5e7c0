use super::LoaderConfig;
use crate::modules::ModuleManifest;
use module_registry::ModuleRegistry;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of a [`ModuleLoader::load`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub passes: usize,
    /// Names in the order their registration was accepted.
    pub accepted: Vec<String>,
    /// Names still deferred when loading stopped.
    pub deferred: Vec<String>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.deferred.is_empty()
    }
}

/// Submits manifests the way independently loaded bundles do: in whatever order they
/// arrive, re-submitting deferred ones until they are accepted.
///
/// Each pass re-registers every still-deferred manifest. Loading stops when nothing is
/// deferred, when a pass accepts nothing, or after `max_passes` passes.
#[derive(Debug, Clone, Default)]
pub struct ModuleLoader {
    config: LoaderConfig,
}

impl ModuleLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn load(&self, registry: &mut ModuleRegistry, manifests: Vec<ModuleManifest>) -> LoadReport {
        let mut report = LoadReport::default();
        let mut pending = manifests;

        while !pending.is_empty() && report.passes < self.config.max_passes {
            report.passes += 1;
            let before = pending.len();

            pending.retain(|manifest| {
                let accepted = manifest.register_with(registry);
                if accepted {
                    report.accepted.push(manifest.name.to_string());
                }
                !accepted
            });

            debug!(
                pass = report.passes,
                accepted = before - pending.len(),
                remaining = pending.len(),
                "Load pass complete"
            );
            if pending.len() == before {
                break;
            }
        }

        report.deferred = pending.iter().map(|manifest| manifest.name.to_string()).collect();
        if report.is_complete() {
            info!(passes = report.passes, modules = report.accepted.len(), "All modules registered");
        } else {
            warn!(
                passes = report.passes,
                deferred = ?report.deferred,
                "Some modules are still waiting on dependencies"
            );
        }
        report
    }
}
