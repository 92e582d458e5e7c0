//! # Module Registry
//!
//! This crate provides the lifecycle kernel for a modular application: feature modules
//! register a factory plus the names of the modules they depend on, and the registry
//! constructs them lazily, in dependency order, exactly once.
//!
//! ## Why a Registry?
//!
//! Feature modules (rendering helpers, UI, game systems, persistence) are loaded
//! independently and in no particular order. Wiring them by hand means every module must
//! know when its collaborators exist. The registry inverts that:
//!
//! - Modules **declare** dependencies by name and never construct them.
//! - Construction is **lazy and cached**: the first request builds, later requests reuse.
//! - Failures are **contained**: a broken module is recorded and reported, never thrown
//!   at the caller, and its dependents fail cleanly instead of half-initializing.
//! - Teardown is **ordered**: modules are disposed in the reverse of the order they came up.
//!
//! ## Architecture Overview
//!
//! 1. **Contract** ([`module`]): factories, [`Dependencies`], [`ModuleInstance`] and the
//!    optional [`Disposable`] teardown capability.
//! 2. **Kernel** ([`registry`]): [`ModuleRegistry`], the resolver state machine and cleanup.
//! 3. **Diagnostics** ([`graph`], [`stats`], [`entry`]): dependency graph snapshots,
//!    up-front cycle and missing-dependency validation, counters and per-module records.
//!
//! ## Quick Start
//!
//! ```rust
//! use module_registry::{ModuleInstance, ModuleRegistry, ModuleStatus};
//!
//! let mut registry = ModuleRegistry::new();
//!
//! // Registration order does not matter; `false` means "deferred", not "rejected".
//! assert!(!registry.register("ui", |_| Ok(Some(ModuleInstance::new("ui"))), &["dom"]));
//! assert!(registry.register("dom", |_| Ok(Some(ModuleInstance::new("dom"))), &[]));
//!
//! let summary = registry.initialize_all();
//! assert_eq!(summary.successful, 2);
//! assert_eq!(registry.load_order(), ["dom", "ui"]);
//!
//! registry.cleanup();
//! assert_eq!(registry.status("ui"), Some(ModuleStatus::Destroyed));
//! ```
//!
//! ## Error Handling
//!
//! Nothing in the resolution API returns `Result`. Every failure becomes a [`ModuleError`]
//! stored on the module (see [`ModuleRegistry::module_info`]) and in the error index
//! ([`ModuleRegistry::errors`]); the caller simply receives `None`.
//!
//! ## Concurrency Model
//!
//! Resolution is synchronous and takes `&mut self`. A registry is owned by one composition
//! root; module instances themselves are `Send + Sync` and can be shared freely.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockFactory`](mock::MockFactory) with an expectation
//! API, a shared [`CallLog`](mock::CallLog) for ordering assertions, and a
//! [`TeardownRecorder`](mock::TeardownRecorder) for cleanup tests.

pub mod entry;
pub mod error;
pub mod graph;
pub mod mock;
pub mod module;
pub mod registry;
pub mod stats;
pub mod tracing;

// Re-export core types for convenience
pub use entry::ModuleInfo;
pub use error::{BoxError, ModuleError};
pub use graph::{CycleEdge, DependencyGraph, GraphNode, MissingDependency, ValidationReport};
pub use module::{Dependencies, Disposable, Factory, FactoryResult, ModuleInstance, ModuleStatus};
pub use registry::{ModuleRegistry, RegistryBuilder};
pub use stats::{InitSummary, RegistryStats};
