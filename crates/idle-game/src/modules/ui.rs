//! Top-level UI shell. Owns which panel is visible.

use super::dom_elements::{self, DomElements};
use super::ModuleManifest;
use module_registry::{Dependencies, FactoryResult, ModuleInstance};
use std::sync::{Arc, Mutex, PoisonError};

pub const NAME: &str = "ui";

#[derive(Debug)]
pub struct Ui {
    dom: Arc<DomElements>,
    active_panel: Mutex<&'static str>,
}

impl Ui {
    pub fn dom(&self) -> &Arc<DomElements> {
        &self.dom
    }

    pub fn show(&self, panel: &'static str) {
        *self.active_panel.lock().unwrap_or_else(PoisonError::into_inner) = panel;
    }

    pub fn active_panel(&self) -> &'static str {
        *self.active_panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[dom_elements::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let dom = deps.require::<DomElements>(dom_elements::NAME)?;
    Ok(Some(ModuleInstance::new(Ui {
        dom,
        active_panel: Mutex::new("shop"),
    })))
}
