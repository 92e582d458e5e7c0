//! Cached element lookups shared by every presentation module.

use super::dom::{self, DomFacility};
use super::ModuleManifest;
use module_registry::{Dependencies, FactoryResult, ModuleInstance};
use std::collections::HashMap;

pub const NAME: &str = "dom_elements";

const SELECTORS: &[(&str, &str)] = &[
    ("counter", "#cookie-counter"),
    ("shop", "#building-shop"),
    ("story", "#story-panel"),
    ("ticker", "#news-ticker"),
    ("canvas", "#particle-canvas"),
];

#[derive(Debug)]
pub struct DomElements {
    elements: HashMap<&'static str, String>,
}

impl DomElements {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.elements.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[dom::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let dom = deps.require::<DomFacility>(dom::NAME)?;
    let elements = SELECTORS
        .iter()
        .map(|(key, selector)| (*key, dom.query(selector)))
        .collect();
    Ok(Some(ModuleInstance::new(DomElements { elements })))
}
