//! # Game Lifecycle & Composition
//!
//! This module is the composition root: it creates the [`ModuleRegistry`](module_registry::ModuleRegistry),
//! feeds it every feature module, boots the game and shuts it down.
//!
//! ## Loading
//!
//! Feature bundles load independently, so a module routinely registers before the
//! modules it depends on. The registry answers such a registration with `false`
//! ("deferred"); the [`ModuleLoader`] then keeps re-submitting deferred manifests in
//! polling passes until they are accepted:
//!
//! ```text
//! pass 1: buildings (deferred) story (deferred) ui (deferred) ... dom_elements (ok)
//! pass 2: buildings (deferred) story (deferred) ui (ok) news_ticker (ok) particles (ok)
//! pass 3: buildings (ok) story (ok) save_system (ok)
//! ```
//!
//! A module whose dependency is itself still deferred stays deferred, so acceptance
//! follows dependency depth.
//!
//! Retrying is the loader's job, not the registry's. The number of passes is bounded by
//! [`LoaderConfig::max_passes`].
//!
//! ## Boot & Shutdown
//!
//! [`GameSystem::boot`] validates the dependency graph, then initializes every module.
//! Dependency order falls out of the registry's recursive resolution, so the loader never
//! sorts anything. [`GameSystem::shutdown`] runs the registry's cleanup, which disposes
//! modules (the news ticker's background task, the save system's final flush) in reverse
//! initialization order.
//!
//! ## Configuration
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `IDLE_GAME_LOAD_PASSES` | Overrides [`LoaderConfig::max_passes`] |
//! | `RUST_LOG` | Log filter (`info`, `debug`, `module_registry=debug`, ...) |

pub mod config;
pub mod error;
pub mod game_system;
pub mod loader;

pub use config::*;
pub use error::*;
pub use game_system::*;
pub use loader::*;
