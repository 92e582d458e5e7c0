use super::ui::{self, Ui};
use super::ModuleManifest;
use module_registry::{Dependencies, FactoryResult, ModuleInstance};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const NAME: &str = "story";

const CHAPTERS: &[&str] = &["prologue", "the-first-batch", "grandma-arrives", "industrial-age"];

#[derive(Debug)]
pub struct Story {
    ui: Arc<Ui>,
    chapter: AtomicUsize,
}

impl Story {
    pub fn current_chapter(&self) -> &'static str {
        CHAPTERS[self.chapter.load(Ordering::Relaxed)]
    }

    /// Moves to the next chapter, staying on the last one once reached.
    pub fn advance(&self) -> &'static str {
        let last = CHAPTERS.len() - 1;
        let _ = self
            .chapter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |chapter| {
                (chapter < last).then_some(chapter + 1)
            });
        self.ui.show("story");
        self.current_chapter()
    }
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[ui::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let ui = deps.require::<Ui>(ui::NAME)?;
    Ok(Some(ModuleInstance::new(Story {
        ui,
        chapter: AtomicUsize::new(0),
    })))
}
