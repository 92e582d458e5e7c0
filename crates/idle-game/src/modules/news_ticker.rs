//! Rotating news headlines.
//!
//! The only module that owns a live resource: its factory spawns a Tokio interval task,
//! and its [`Disposable`] implementation aborts that task during cleanup. Construction
//! fails if no Tokio runtime is running.

use super::dom_elements::DomElements;
use super::ui::{self, Ui};
use super::ModuleManifest;
use module_registry::{BoxError, Dependencies, Disposable, FactoryResult, ModuleInstance};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const NAME: &str = "news_ticker";

pub const TICK_INTERVAL: Duration = Duration::from_secs(8);

const HEADLINES: &[&str] = &[
    "Local bakery reports record output",
    "Grandmas unionize, demand more rolling pins",
    "Scientists baffled by self-replicating cookies",
    "Cookie futures surge on farm expansion news",
];

#[derive(Debug)]
pub struct NewsTicker {
    element: String,
    ticks: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NewsTicker {
    /// Number of headlines shown so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Disposable for NewsTicker {
    fn dispose(&self) -> Result<(), BoxError> {
        if let Some(task) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
            info!(ticks = self.ticks(), "News ticker stopped");
        }
        Ok(())
    }
}

pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(NAME, &[ui::NAME], build)
}

fn build(deps: &Dependencies) -> FactoryResult {
    let ui = deps.require::<Ui>(ui::NAME)?;
    let runtime = tokio::runtime::Handle::try_current()?;
    let element = element_of(ui.dom()).ok_or("no ticker element in the page")?;

    let ticks = Arc::new(AtomicU64::new(0));
    let counter = ticks.clone();
    let task = runtime.spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            let shown = counter.fetch_add(1, Ordering::Relaxed);
            let headline = HEADLINES[(shown as usize) % HEADLINES.len()];
            debug!(headline, "News");
        }
    });

    Ok(Some(ModuleInstance::disposable(NewsTicker {
        element,
        ticks,
        task: Mutex::new(Some(task)),
    })))
}

fn element_of(dom: &DomElements) -> Option<String> {
    dom.get("ticker").map(str::to_string)
}
