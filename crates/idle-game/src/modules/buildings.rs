//! Building shop. Tracks owned counts only; pricing lives elsewhere.

use super::ui::{self, Ui};
use super::ModuleManifest;
use module_registry::{Dependencies, FactoryResult, ModuleInstance};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

pub const NAME: &str = "buildings";

const CATALOG: &[&str] = &["cursor", "grandma", "farm", "mine", "factory"];

#[derive(Debug)]
pub struct Building {
    pub name: &'static str,
    owned: AtomicU32,
}

impl Building {
    pub fn owned(&self) -> u32 {
        self.owned.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Buildings {
    ui: Arc<Ui>,
    catalog: Vec<Building>,
}

impl Buildings {
    pub fn catalog(&self) -> &[Building] {
        &self.catalog
    }

    /// Adds one building of the given kind and returns the new count.
    pub fn purchase(&self, name: &str) -> Option<u32> {
        let building = self.catalog.iter().find(|building| building.name == name)?;
        let owned = building.owned.fetch_add(1, Ordering::Relaxed) + 1;
        self.ui.show("shop");
        debug!(building = name, owned, "Purchased");
        Some(owned)
    }

    pub fn total_owned(&self) -> u32 {
        self.catalog.iter().map(Building::owned).sum()
    }
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[ui::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let ui = deps.require::<Ui>(ui::NAME)?;
    let catalog = CATALOG
        .iter()
        .map(|&name| Building {
            name,
            owned: AtomicU32::new(0),
        })
        .collect();
    Ok(Some(ModuleInstance::new(Buildings { ui, catalog })))
}
