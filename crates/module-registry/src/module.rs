//! # Module Contract
//!
//! This module defines what the registry knows about the modules it manages, which is
//! deliberately very little:
//!
//! - A module is built by a **factory**: `Fn(&Dependencies) -> FactoryResult`.
//! - The factory receives [`Dependencies`], a name-keyed map of already-resolved instances.
//! - The factory returns a [`ModuleInstance`], an opaque shared handle to any `Send + Sync` value.
//! - A module may opt into teardown by implementing [`Disposable`] and wrapping itself with
//!   [`ModuleInstance::disposable`]. The registry checks for that capability during
//!   [`cleanup`](crate::ModuleRegistry::cleanup) instead of probing for a method at runtime.
//!
//! ```rust
//! use module_registry::{BoxError, Disposable, ModuleInstance};
//!
//! struct Ticker;
//!
//! impl Disposable for Ticker {
//!     fn dispose(&self) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let plain = ModuleInstance::new(42u32);
//! assert!(!plain.is_disposable());
//! assert_eq!(plain.downcast_ref::<u32>(), Some(&42));
//!
//! let ticker = ModuleInstance::disposable(Ticker);
//! assert!(ticker.is_disposable());
//! ```

use crate::error::{BoxError, ModuleError};
use indexmap::IndexMap;
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of a registered module.
///
/// ```text
/// Registered -> Initializing -> Initialized -> CleaningUp -> Destroyed
///                           \-> Failed
/// ```
///
/// `Failed` and `Destroyed` are terminal until the caller registers the name again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Registered,
    Initializing,
    Initialized,
    Failed,
    CleaningUp,
    Destroyed,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleStatus::Registered => "registered",
            ModuleStatus::Initializing => "initializing",
            ModuleStatus::Initialized => "initialized",
            ModuleStatus::Failed => "failed",
            ModuleStatus::CleaningUp => "cleaning_up",
            ModuleStatus::Destroyed => "destroyed",
        };
        f.write_str(label)
    }
}

/// Teardown capability for module instances.
///
/// Called once, in reverse initialization order, by [`cleanup`](crate::ModuleRegistry::cleanup).
/// Errors (and panics) are logged and never stop the remaining teardowns.
pub trait Disposable: Send + Sync {
    fn dispose(&self) -> Result<(), BoxError>;
}

/// Shared handle to a constructed module.
///
/// Cloning is cheap (two `Arc` clones). The registry keeps one handle for as long as the
/// module is `Initialized`; callers and dependents hold further clones.
#[derive(Clone)]
pub struct ModuleInstance {
    value: Arc<dyn Any + Send + Sync>,
    teardown: Option<Arc<dyn Disposable>>,
}

impl ModuleInstance {
    /// Wraps a value that needs no teardown.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            teardown: None,
        }
    }

    /// Wraps an already shared value.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            teardown: None,
        }
    }

    /// Wraps a value whose [`Disposable::dispose`] runs during cleanup.
    pub fn disposable<T: Disposable + Any>(value: T) -> Self {
        let value = Arc::new(value);
        Self {
            value: value.clone(),
            teardown: Some(value),
        }
    }

    pub fn is_disposable(&self) -> bool {
        self.teardown.is_some()
    }

    /// Returns a typed handle if the instance holds a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    /// `true` when both handles point at the same constructed value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    pub(crate) fn teardown_hook(&self) -> Option<&Arc<dyn Disposable>> {
        self.teardown.as_ref()
    }
}

impl fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("disposable", &self.is_disposable())
            .finish_non_exhaustive()
    }
}

/// Resolved dependencies handed to a factory, keyed by module name, in declaration order.
///
/// A factory only ever sees a fully populated map: if any declared dependency fails to
/// resolve, the factory is not invoked at all.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    resolved: IndexMap<String, ModuleInstance>,
}

impl Dependencies {
    pub fn get(&self, name: &str) -> Option<&ModuleInstance> {
        self.resolved.get(name)
    }

    /// Typed lookup: `None` if the name is absent or holds a different type.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.resolved.get(name).and_then(ModuleInstance::downcast::<T>)
    }

    /// Typed lookup for use with `?` inside factories.
    pub fn require<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ModuleError> {
        self.get_as::<T>(name)
            .ok_or_else(|| ModuleError::DependencyMismatch {
                dependency: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resolved.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, instance: ModuleInstance) {
        self.resolved.insert(name, instance);
    }
}

/// What a factory produces. `Ok(None)` is treated as a failure ("returned no instance").
pub type FactoryResult = Result<Option<ModuleInstance>, BoxError>;

/// Boxed factory as stored by the registry.
pub type Factory = Box<dyn Fn(&Dependencies) -> FactoryResult + Send + Sync>;
