//! # Idle Game
//!
//! Composition root of the idle game. Exposes the lifecycle layer and the feature modules
//! for the binary and for integration testing.

pub mod lifecycle;
pub mod modules;
