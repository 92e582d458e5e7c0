//! # Observability & Tracing
//!
//! The registry logs through the `tracing` facade and never installs a subscriber itself.
//! Binaries call [`setup_tracing`] once at startup.
//!
//! ## What Gets Traced
//!
//! - **Registration**: `info` for ready and deferred registrations, `warn` on overwrite
//! - **Resolution**: `debug` for cache hits and each resolved dependency
//! - **Initialization**: `info` with `elapsed_ms` on success, `warn` with the error on failure
//! - **Teardown**: `info` at start and end of cleanup, `warn` for failing hooks
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle milestones only
//! RUST_LOG=info cargo run
//!
//! # Every dependency resolution and cache hit
//! RUST_LOG=module_registry=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a boot looks like:
//!
//! ```text
//! INFO Registered module="dom_elements" dependencies=[]
//! INFO Registration deferred until dependencies are registered module="buildings" pending=["ui"]
//! INFO Initialized module="dom_elements" elapsed_ms=0.004
//! INFO All modules initialized successful=7 total=7 time_ms=0.31
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // module names are carried as fields
        .compact()
        .init();
}
