//! The DOM-access facility. Created by the host before any module loads and handed to the
//! registry as an external singleton, so it is never constructed or torn down there.

pub const NAME: &str = "dom";

#[derive(Debug, Clone)]
pub struct DomFacility {
    root: String,
}

impl DomFacility {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolves a selector relative to the game root.
    pub fn query(&self, selector: &str) -> String {
        format!("{} {}", self.root, selector)
    }
}
