use super::dom_elements::{self, DomElements};
use super::ModuleManifest;
use module_registry::{Dependencies, FactoryResult, ModuleInstance};

pub const NAME: &str = "particles";

const MAX_PARTICLES: usize = 200;

#[derive(Debug)]
pub struct Particles {
    pub canvas: String,
    pub max_particles: usize,
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[dom_elements::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let dom = deps.require::<DomElements>(dom_elements::NAME)?;
    let canvas = dom.get("canvas").ok_or("no particle canvas in the page")?;
    Ok(Some(ModuleInstance::new(Particles {
        canvas: canvas.to_string(),
        max_particles: MAX_PARTICLES,
    })))
}
