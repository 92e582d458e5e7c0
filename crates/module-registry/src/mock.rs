//! # Mock Factories & Testing Guide
//!
//! Testing a lifecycle kernel means asserting *when* things happen: which factory ran,
//! how often, with which dependencies, and in which order teardown hooks fired. This
//! module provides the doubles for that:
//!
//! - [`CallLog`]: a shared, ordered event log (`"init:ui"`, `"dispose:ui"`, ...).
//! - [`MockFactory`]: a factory with a fluent expectation API, in the same spirit as a
//!   mocked client: queue up what each call should produce, hand the factory to the
//!   registry, then [`verify`](MockFactory::verify) that every expectation was consumed.
//! - [`TeardownRecorder`]: a [`Disposable`] instance that logs (or fails) its teardown.
//!
//! ## When to use what
//!
//! | Need | Tool |
//! |------|------|
//! | Count factory invocations | [`MockFactory::calls`] |
//! | Check what was injected | [`MockFactory::injected`] |
//! | Check construction vs teardown order | shared [`CallLog`] |
//! | Inject failures | `return_err`, `return_none`, `panics` |
//!
//! ## Example
//!
//! ```rust
//! use module_registry::mock::{CallLog, MockFactory};
//! use module_registry::ModuleRegistry;
//!
//! let log = CallLog::new();
//! let mut dom = MockFactory::with_log("dom", &log);
//! let mut ui = MockFactory::with_log("ui", &log);
//! dom.expect_call().return_recorder();
//! ui.expect_call().return_recorder();
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register("dom", dom.factory(), &[]);
//! registry.register("ui", ui.factory(), &["dom"]);
//!
//! registry.get_module("ui").unwrap();
//! registry.cleanup();
//!
//! assert_eq!(log.events(), ["init:dom", "init:ui", "dispose:ui", "dispose:dom"]);
//! assert_eq!(ui.injected(), vec![vec!["dom".to_string()]]);
//! dom.verify();
//! ui.verify();
//! ```

use crate::error::BoxError;
use crate::module::{Dependencies, Disposable, FactoryResult, ModuleInstance};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared, ordered event log. Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        lock(&self.events).push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        lock(&self.events).clone()
    }

    /// Index of the first occurrence of `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        lock(&self.events).iter().position(|recorded| recorded == event)
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

/// Error produced by [`CallExpectationBuilder::return_err`].
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

enum Expectation {
    Instance(ModuleInstance),
    Recorder,
    NoInstance,
    Error(String),
    Panic(String),
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    injected: Vec<Vec<String>>,
}

/// A factory double with queued expectations.
///
/// Each invocation consumes the next expectation. An invocation with nothing queued
/// panics, which the registry reports as a failed module.
#[derive(Clone)]
pub struct MockFactory {
    name: String,
    log: CallLog,
    state: Arc<Mutex<MockState>>,
}

impl MockFactory {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_log(name, &CallLog::new())
    }

    /// Creates a mock that records into a log shared with other mocks.
    pub fn with_log(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queues the outcome of the next factory call.
    pub fn expect_call(&mut self) -> CallExpectationBuilder {
        CallExpectationBuilder {
            name: self.name.clone(),
            log: self.log.clone(),
            state: self.state.clone(),
        }
    }

    /// The factory closure to hand to [`ModuleRegistry::register`](crate::ModuleRegistry::register).
    pub fn factory(&self) -> impl Fn(&Dependencies) -> FactoryResult + Send + Sync + 'static {
        let name = self.name.clone();
        let log = self.log.clone();
        let state = self.state.clone();
        move |deps: &Dependencies| {
            log.record(format!("init:{name}"));
            let next = {
                let mut state = lock(&state);
                state.injected.push(deps.names().map(str::to_string).collect());
                state.expectations.pop_front()
            };
            match next {
                Some(Expectation::Instance(instance)) => Ok(Some(instance)),
                Some(Expectation::Recorder) => {
                    Ok(Some(TeardownRecorder::new(&name, &log).into_instance()))
                }
                Some(Expectation::NoInstance) => Ok(None),
                Some(Expectation::Error(message)) => Err(Box::new(MockError(message)) as BoxError),
                Some(Expectation::Panic(message)) => panic!("{message}"),
                None => panic!("Unexpected factory call for {name}"),
            }
        }
    }

    /// Number of times the factory ran.
    pub fn calls(&self) -> usize {
        lock(&self.state).injected.len()
    }

    /// Dependency names seen by each call, in call order.
    pub fn injected(&self) -> Vec<Vec<String>> {
        lock(&self.state).injected.clone()
    }

    /// Panics if queued expectations were never consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.state).expectations.len();
        if remaining != 0 {
            panic!(
                "Not all expectations for {} were met. {} remaining",
                self.name, remaining
            );
        }
    }
}

/// Builder returned by [`MockFactory::expect_call`].
pub struct CallExpectationBuilder {
    name: String,
    log: CallLog,
    state: Arc<Mutex<MockState>>,
}

impl CallExpectationBuilder {
    fn push(self, expectation: Expectation) {
        lock(&self.state).expectations.push_back(expectation);
    }

    /// The call returns the given instance.
    pub fn return_ok(self, instance: ModuleInstance) {
        self.push(Expectation::Instance(instance));
    }

    /// The call returns a fresh [`TeardownRecorder`] that logs `dispose:<name>`.
    pub fn return_recorder(self) {
        self.push(Expectation::Recorder);
    }

    /// The call returns a recorder whose teardown fails with `message`.
    pub fn return_failing_recorder(self, message: impl Into<String>) {
        let recorder = TeardownRecorder::failing(&self.name, &self.log, message);
        self.push(Expectation::Instance(recorder.into_instance()));
    }

    pub fn return_none(self) {
        self.push(Expectation::NoInstance);
    }

    pub fn return_err(self, message: impl Into<String>) {
        self.push(Expectation::Error(message.into()));
    }

    pub fn panics(self, message: impl Into<String>) {
        self.push(Expectation::Panic(message.into()));
    }
}

/// A disposable instance that records `dispose:<name>` into a [`CallLog`].
#[derive(Debug, Clone)]
pub struct TeardownRecorder {
    name: String,
    log: CallLog,
    fail_with: Option<String>,
}

impl TeardownRecorder {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            fail_with: None,
        }
    }

    /// A recorder that logs its teardown and then reports `message` as an error.
    pub fn failing(name: &str, log: &CallLog, message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new(name, log)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_instance(self) -> ModuleInstance {
        ModuleInstance::disposable(self)
    }
}

impl Disposable for TeardownRecorder {
    fn dispose(&self) -> Result<(), BoxError> {
        self.log.record(format!("dispose:{}", self.name));
        match &self.fail_with {
            Some(message) => Err(Box::new(MockError(message.clone()))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectations_are_consumed_in_order() {
        let mut mock = MockFactory::new("ui");
        mock.expect_call().return_ok(ModuleInstance::new(1u8));
        mock.expect_call().return_none();
        mock.expect_call().return_err("boom");

        let factory = mock.factory();
        let deps = Dependencies::default();

        assert!(factory(&deps).unwrap().is_some());
        assert!(factory(&deps).unwrap().is_none());
        assert_eq!(factory(&deps).unwrap_err().to_string(), "boom");
        assert_eq!(mock.calls(), 3);
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "1 remaining")]
    fn test_verify_panics_on_unmet_expectations() {
        let mut mock = MockFactory::new("ui");
        mock.expect_call().return_recorder();
        mock.verify();
    }

    #[test]
    fn test_recorder_logs_and_optionally_fails() {
        let log = CallLog::new();
        let ok = TeardownRecorder::new("a", &log);
        let bad = TeardownRecorder::failing("b", &log, "stuck");

        assert!(ok.dispose().is_ok());
        assert_eq!(bad.dispose().unwrap_err().to_string(), "stuck");
        assert_eq!(log.events(), ["dispose:a", "dispose:b"]);
        assert_eq!(log.position("dispose:b"), Some(1));
    }
}
