use super::{GameError, LoadReport, LoaderConfig, ModuleLoader};
use crate::modules::{self, dom, ModuleManifest};
use module_registry::{
    DependencyGraph, InitSummary, ModuleInfo, ModuleInstance, ModuleRegistry, RegistryStats,
    ValidationReport,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

/// CSS root every element lookup is resolved against.
pub const GAME_ROOT: &str = "#game";

/// Result of [`GameSystem::boot`].
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub summary: InitSummary,
    pub validation: ValidationReport,
}

/// Everything worth dumping about the running system.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub load: LoadReport,
    pub load_order: Vec<String>,
    pub stats: RegistryStats,
    pub modules: Vec<ModuleInfo>,
    pub graph: DependencyGraph,
}

/// The game's composition root.
///
/// `GameSystem` owns the [`ModuleRegistry`] and is responsible for:
/// - **Host facilities**: installing the DOM facility as an external singleton
/// - **Loading**: feeding every feature manifest through the [`ModuleLoader`]
/// - **Boot**: initializing everything and reporting what failed
/// - **Shutdown**: reverse-order teardown through the registry
///
/// # Example
///
/// ```rust
/// use idle_game::lifecycle::{GameSystem, LoaderConfig};
/// use idle_game::modules::story::{self, Story};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut game = GameSystem::new(LoaderConfig::default());
///     let report = game.boot();
///     assert!(report.summary.all_succeeded());
///
///     let story = game.module::<Story>(story::NAME)?;
///     assert_eq!(story.current_chapter(), "prologue");
///
///     game.shutdown();
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct GameSystem {
    registry: ModuleRegistry,
    load_report: LoadReport,
}

impl GameSystem {
    /// Builds the registry and loads every feature module. Nothing is initialized yet.
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_manifests(config, modules::manifests())
    }

    /// Like [`new`](Self::new), but with an explicit set of manifests.
    pub fn with_manifests(config: LoaderConfig, manifests: Vec<ModuleManifest>) -> Self {
        let mut registry = ModuleRegistry::builder()
            .external(dom::NAME, ModuleInstance::new(dom::DomFacility::new(GAME_ROOT)))
            .build();
        let load_report = ModuleLoader::new(config).load(&mut registry, manifests);
        Self {
            registry,
            load_report,
        }
    }

    /// Initializes every registered module. Failures are reported, never raised: the
    /// game keeps running without the failed features.
    pub fn boot(&mut self) -> BootReport {
        let validation = self.registry.validate_dependencies();
        for missing in &validation.missing {
            warn!(module = %missing.module, missing = %missing.missing_dep, "Missing dependency");
        }
        for edge in &validation.circular {
            warn!(module = %edge.module, dependency = %edge.circular_dep, "Circular dependency");
        }

        let summary = self.registry.initialize_all();
        for (module, error) in self.registry.errors() {
            warn!(module, error = %error, "Feature unavailable");
        }
        info!(
            successful = summary.successful,
            total = summary.total,
            time_ms = summary.time_ms,
            "Game booted"
        );

        BootReport {
            summary,
            validation,
        }
    }

    /// Typed access to a module, initializing it if needed.
    pub fn module<T: Any + Send + Sync>(&mut self, name: &str) -> Result<Arc<T>, GameError> {
        self.registry
            .get_module(name)
            .and_then(|instance| instance.downcast::<T>())
            .ok_or_else(|| GameError::Unavailable {
                module: name.to_string(),
            })
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            load: self.load_report.clone(),
            load_order: self.registry.load_order().to_vec(),
            stats: self.registry.stats().clone(),
            modules: self.registry.modules_info(),
            graph: self.registry.dependency_graph(),
        }
    }

    pub fn diagnostics_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(&self.diagnostics())?)
    }

    /// Tears every initialized module down in reverse initialization order.
    pub fn shutdown(mut self) {
        info!("Shutting down game...");
        self.registry.cleanup();
        info!("Game shutdown complete.");
    }
}
