//! # Feature Modules
//!
//! Thin stand-ins for the game's feature modules. Each one exposes a `NAME`, a
//! `manifest()` describing its dependencies, and the instance type its factory builds.
//! The registry treats all of them as opaque; what they contain only matters to their
//! dependents.
//!
//! | Module | Depends on |
//! |--------|------------|
//! | [`dom_elements`] | `dom` (external) |
//! | [`ui`] | `dom_elements` |
//! | [`particles`] | `dom_elements` |
//! | [`buildings`] | `ui` |
//! | [`story`] | `ui` |
//! | [`news_ticker`] | `ui` |
//! | [`save_system`] | `buildings`, `story` |

pub mod buildings;
pub mod dom;
pub mod dom_elements;
pub mod news_ticker;
pub mod particles;
pub mod save_system;
pub mod story;
pub mod ui;

use module_registry::{Dependencies, FactoryResult, ModuleRegistry};
use std::fmt;
use std::sync::Arc;

type SharedFactory = Arc<dyn Fn(&Dependencies) -> FactoryResult + Send + Sync>;

/// What a feature module submits to the loader: its name, its dependencies and its factory.
///
/// The factory is shared so the same manifest can be submitted again after a deferred
/// registration.
#[derive(Clone)]
pub struct ModuleManifest {
    pub name: &'static str,
    pub dependencies: &'static [&'static str],
    factory: SharedFactory,
}

impl ModuleManifest {
    pub fn new<F>(name: &'static str, dependencies: &'static [&'static str], factory: F) -> Self
    where
        F: Fn(&Dependencies) -> FactoryResult + Send + Sync + 'static,
    {
        Self {
            name,
            dependencies,
            factory: Arc::new(factory),
        }
    }

    /// Submits the manifest; `false` means the registration was deferred.
    pub fn register_with(&self, registry: &mut ModuleRegistry) -> bool {
        let factory = self.factory.clone();
        registry.register(self.name, move |deps: &Dependencies| factory(deps), self.dependencies)
    }
}

impl fmt::Debug for ModuleManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleManifest")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Every feature module, in the order their bundles typically finish loading.
///
/// This is deliberately not a dependency order: dependents routinely arrive before the
/// modules they need.
pub fn manifests() -> Vec<ModuleManifest> {
    vec![
        buildings::manifest(),
        story::manifest(),
        ui::manifest(),
        save_system::manifest(),
        news_ticker::manifest(),
        particles::manifest(),
        dom_elements::manifest(),
    ]
}
