//! Save slot bookkeeping. Flushes once more when torn down.

use super::buildings::{self, Buildings};
use super::story::{self, Story};
use super::ModuleManifest;
use module_registry::{BoxError, Dependencies, Disposable, FactoryResult, ModuleInstance};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::info;

pub const NAME: &str = "save_system";

pub const SLOT: &str = "idle-game.save.0";

#[derive(Debug)]
pub struct SaveSystem {
    buildings: Arc<Buildings>,
    story: Arc<Story>,
    flushes: AtomicU32,
}

impl SaveSystem {
    /// Records a save of the current progress and returns how many saves happened so far.
    pub fn flush(&self) -> u32 {
        let flushes = self.flushes.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            slot = SLOT,
            buildings = self.buildings.total_owned(),
            chapter = self.story.current_chapter(),
            flushes,
            "Saved"
        );
        flushes
    }

    pub fn flushes(&self) -> u32 {
        self.flushes.load(Ordering::Relaxed)
    }
}

impl Disposable for SaveSystem {
    fn dispose(&self) -> Result<(), BoxError> {
        self.flush();
        Ok(())
    }
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[buildings::NAME, story::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let buildings = deps.require::<Buildings>(buildings::NAME)?;
    let story = deps.require::<Story>(story::NAME)?;
    Ok(Some(ModuleInstance::disposable(SaveSystem {
        buildings,
        story,
        flushes: AtomicU32::new(0),
    })))
}
