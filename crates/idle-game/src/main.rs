//! # Idle Game
//!
//! Boots every feature module through the module registry, plays a few moves, prints the
//! registry diagnostics as JSON and shuts down.
//!
//! ```bash
//! RUST_LOG=info cargo run -p idle-game
//! RUST_LOG=module_registry=debug IDLE_GAME_LOAD_PASSES=3 cargo run -p idle-game
//! ```

use idle_game::lifecycle::{GameError, GameSystem, LoaderConfig};
use idle_game::modules::buildings::{self, Buildings};
use idle_game::modules::save_system::{self, SaveSystem};
use idle_game::modules::story::{self, Story};
use module_registry::tracing::setup_tracing;
use std::time::Duration;
use tracing::{info, info_span, warn};

#[tokio::main]
async fn main() -> Result<(), GameError> {
    setup_tracing();

    let config = LoaderConfig::from_env()?;
    info!(max_passes = config.max_passes, "Starting idle game");

    let mut game = info_span!("load").in_scope(|| GameSystem::new(config));
    let report = info_span!("boot").in_scope(|| game.boot());
    if !report.summary.all_succeeded() {
        warn!(failed = report.summary.failed(), "Playing with reduced features");
    }

    info_span!("play").in_scope(|| play(&mut game));

    // let the news ticker show a headline or two
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("{}", game.diagnostics_json()?);

    game.shutdown();
    info!("Idle game exited cleanly");
    Ok(())
}

fn play(game: &mut GameSystem) {
    match game.module::<Buildings>(buildings::NAME) {
        Ok(shop) => {
            shop.purchase("cursor");
            shop.purchase("grandma");
        }
        Err(e) => warn!(error = %e, "Shop unavailable"),
    }
    if let Ok(story) = game.module::<Story>(story::NAME) {
        info!(chapter = story.advance(), "Story advanced");
    }
    if let Ok(saves) = game.module::<SaveSystem>(save_system::NAME) {
        saves.flush();
    }
}
