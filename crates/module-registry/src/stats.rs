//! # Lifecycle & Statistics Tracker
//!
//! Observes every resolution outcome of the registry:
//!
//! - monotonic counters ([`RegistryStats`]) that survive [`cleanup`](crate::ModuleRegistry::cleanup),
//! - the **load order**, i.e. the exact sequence in which modules reached `Initialized`,
//!   which `cleanup` walks backwards,
//! - the **error index**, the last failure recorded per module name.

use crate::error::ModuleError;
use indexmap::IndexMap;
use serde::Serialize;
use std::time::Duration;

/// Aggregate counters. They only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistryStats {
    /// Registrations accepted as ready. Deferred ones are not counted until a retry is accepted.
    pub registered: u64,
    pub initialized: u64,
    pub failed: u64,
    /// Sum of factory execution times.
    pub total_init_time_ms: f64,
}

/// Result of [`initialize_all`](crate::ModuleRegistry::initialize_all).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitSummary {
    pub successful: usize,
    pub total: usize,
    pub time_ms: f64,
}

impl InitSummary {
    pub fn all_succeeded(&self) -> bool {
        self.successful == self.total
    }

    pub fn failed(&self) -> usize {
        self.total - self.successful
    }
}

pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[derive(Debug, Default)]
pub(crate) struct Tracker {
    stats: RegistryStats,
    load_order: Vec<String>,
    errors: IndexMap<String, ModuleError>,
}

impl Tracker {
    pub(crate) fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    pub(crate) fn load_order(&self) -> &[String] {
        &self.load_order
    }

    pub(crate) fn errors(&self) -> impl Iterator<Item = (&str, &ModuleError)> {
        self.errors.iter().map(|(name, error)| (name.as_str(), error))
    }

    pub(crate) fn record_registration(&mut self) {
        self.stats.registered += 1;
    }

    pub(crate) fn record_success(&mut self, name: &str, elapsed: Duration) {
        self.stats.initialized += 1;
        self.stats.total_init_time_ms += as_millis_f64(elapsed);
        self.load_order.push(name.to_string());
        self.errors.shift_remove(name);
    }

    pub(crate) fn record_failure(&mut self, name: &str, error: ModuleError) {
        self.stats.failed += 1;
        self.errors.insert(name.to_string(), error);
    }

    /// Drops every index reference to `name` (used when a registration is overwritten).
    pub(crate) fn forget(&mut self, name: &str) {
        self.load_order.retain(|loaded| loaded != name);
        self.errors.shift_remove(name);
    }

    /// Hands the load order over for teardown, leaving it empty.
    pub(crate) fn take_load_order(&mut self) -> Vec<String> {
        std::mem::take(&mut self.load_order)
    }

    pub(crate) fn clear_indices(&mut self) {
        self.load_order.clear();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_appends_load_order_and_counts() {
        let mut tracker = Tracker::default();
        tracker.record_registration();
        tracker.record_registration();
        tracker.record_success("dom", Duration::from_millis(2));
        tracker.record_success("ui", Duration::from_millis(3));

        assert_eq!(tracker.load_order(), ["dom", "ui"]);
        assert_eq!(tracker.stats().registered, 2);
        assert_eq!(tracker.stats().initialized, 2);
        assert!((tracker.stats().total_init_time_ms - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_forget_removes_name_from_indices() {
        let mut tracker = Tracker::default();
        tracker.record_success("ui", Duration::ZERO);
        tracker.record_failure(
            "story",
            ModuleError::NoInstance {
                module: "story".into(),
            },
        );

        tracker.forget("ui");
        tracker.forget("story");

        assert!(tracker.load_order().is_empty());
        assert_eq!(tracker.errors().count(), 0);
        // counters are monotonic
        assert_eq!(tracker.stats().initialized, 1);
        assert_eq!(tracker.stats().failed, 1);
    }

    #[test]
    fn test_take_load_order_empties_it() {
        let mut tracker = Tracker::default();
        tracker.record_success("a", Duration::ZERO);
        tracker.record_success("b", Duration::ZERO);

        assert_eq!(tracker.take_load_order(), vec!["a", "b"]);
        assert!(tracker.load_order().is_empty());
    }

    #[test]
    fn test_summary_helpers() {
        let summary = InitSummary {
            successful: 2,
            total: 3,
            time_ms: 0.5,
        };
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failed(), 1);
    }
}
