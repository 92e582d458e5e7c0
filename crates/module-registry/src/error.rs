//! # Registry Errors
//!
//! Every way a module can fail to come up (or go down) is described by
//! [`ModuleError`]. None of these are ever returned from the registry's public
//! resolution API: they are recorded on the failing entry and in the error
//! index, and the caller observes `None` from [`get_module`](crate::ModuleRegistry::get_module).

use std::sync::Arc;

/// Boxed error type returned by module factories and teardown hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving or tearing down a module.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModuleError {
    #[error("Unknown module: {name}")]
    UnknownModule { name: String },

    /// Re-entrant resolution of a module that is still `Initializing`.
    /// `chain` is the resolution path, ending with the repeated module.
    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { module: String, chain: Vec<String> },

    #[error("Dependency resolution failed for {module}: unresolved [{}]", unresolved.join(", "))]
    DependencyResolution {
        module: String,
        unresolved: Vec<String>,
    },

    #[error("Factory for {module} failed: {source}")]
    Factory {
        module: String,
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    #[error("Factory for {module} returned no instance")]
    NoInstance { module: String },

    #[error("Factory for {module} panicked: {message}")]
    FactoryPanicked { module: String, message: String },

    #[error("Teardown of {module} failed: {message}")]
    Teardown { module: String, message: String },

    /// Raised by [`Dependencies::require`](crate::Dependencies::require) inside a factory.
    #[error("Dependency `{dependency}` is missing or is not a {expected}")]
    DependencyMismatch {
        dependency: String,
        expected: &'static str,
    },
}

impl ModuleError {
    /// Name of the module this error is about.
    ///
    /// `None` for [`DependencyMismatch`](ModuleError::DependencyMismatch): it is raised inside
    /// a factory, which does not know its own name. The registry reports it wrapped in
    /// [`Factory`](ModuleError::Factory), which names the module.
    pub fn module(&self) -> Option<&str> {
        match self {
            ModuleError::UnknownModule { name } => Some(name),
            ModuleError::CircularDependency { module, .. }
            | ModuleError::DependencyResolution { module, .. }
            | ModuleError::Factory { module, .. }
            | ModuleError::NoInstance { module }
            | ModuleError::FactoryPanicked { module, .. }
            | ModuleError::Teardown { module, .. } => Some(module),
            ModuleError::DependencyMismatch { .. } => None,
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, ModuleError::CircularDependency { .. })
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
