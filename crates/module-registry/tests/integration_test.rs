use module_registry::mock::{CallLog, MockFactory};
use module_registry::{
    CycleEdge, Dependencies, FactoryResult, MissingDependency, ModuleError, ModuleInstance,
    ModuleRegistry, ModuleStatus,
};
use std::sync::Arc;

fn chain_with_log(log: &CallLog) -> (ModuleRegistry, Vec<MockFactory>) {
    // c -> b -> a, registered leaf last so two of them start deferred
    let mut mocks = Vec::new();
    let mut registry = ModuleRegistry::new();
    for (name, deps) in [("c", &["b"][..]), ("b", &["a"][..]), ("a", &[][..])] {
        let mut mock = MockFactory::with_log(name, log);
        mock.expect_call().return_recorder();
        registry.register(name, mock.factory(), deps);
        mocks.push(mock);
    }
    (registry, mocks)
}

/// No factory runs before every one of its dependencies has been initialized.
#[test]
fn test_dependencies_are_constructed_first() {
    let log = CallLog::new();
    let (mut registry, mocks) = chain_with_log(&log);

    assert!(registry.get_module("c").is_some());

    assert_eq!(log.events(), ["init:a", "init:b", "init:c"]);
    assert_eq!(registry.load_order(), ["a", "b", "c"]);
    for mock in &mocks {
        mock.verify();
    }
}

/// A second request returns the cached instance without calling the factory again.
#[test]
fn test_resolution_is_idempotent() {
    let mut ui = MockFactory::new("ui");
    ui.expect_call().return_ok(ModuleInstance::new(String::from("hud")));

    let mut registry = ModuleRegistry::new();
    registry.register("ui", ui.factory(), &[]);

    let first = registry.get_module("ui").expect("ui should initialize");
    let second = registry.get_module("ui").expect("ui should be cached");

    assert!(first.ptr_eq(&second));
    assert_eq!(ui.calls(), 1);
    assert_eq!(registry.stats().initialized, 1);
    ui.verify();
}

/// Mutually dependent modules fail at resolution time instead of recursing forever.
#[test]
fn test_runtime_cycle_fails_both_modules() {
    let a = MockFactory::new("a");
    let b = MockFactory::new("b");

    let mut registry = ModuleRegistry::new();
    registry.register("a", a.factory(), &["b"]);
    registry.register("b", b.factory(), &["a"]);

    assert!(registry.get_module("a").is_none());

    assert_eq!(registry.status("a"), Some(ModuleStatus::Failed));
    assert_eq!(registry.status("b"), Some(ModuleStatus::Failed));
    assert_eq!(a.calls(), 0);
    assert_eq!(b.calls(), 0);

    let info = registry.module_info("a").unwrap();
    assert_eq!(
        info.error.as_deref(),
        Some("Circular dependency detected: a -> b -> a")
    );
    let info = registry.module_info("b").unwrap();
    assert!(info.error.unwrap().contains("unresolved [a]"));
}

/// The static check finds the same cycle without initializing anything.
#[test]
fn test_static_validation_finds_cycle() {
    let mut registry = ModuleRegistry::new();
    registry.register("a", |_| Ok(Some(ModuleInstance::new(()))), &["b"]);
    registry.register("b", |_| Ok(Some(ModuleInstance::new(()))), &["a"]);

    let report = registry.validate_dependencies();

    assert!(!report.valid);
    assert_eq!(
        report.circular,
        vec![CycleEdge {
            module: "b".into(),
            circular_dep: "a".into(),
        }]
    );
    assert_eq!(registry.status("a"), Some(ModuleStatus::Registered));
    assert_eq!(registry.status("b"), Some(ModuleStatus::Registered));
}

#[test]
fn test_static_validation_reports_missing_dependency() {
    let mut registry = ModuleRegistry::new();
    registry.register("a", |_| Ok(Some(ModuleInstance::new(()))), &["ghost"]);

    let report = registry.validate_dependencies();

    assert!(!report.valid);
    assert!(report.missing.contains(&MissingDependency {
        module: "a".into(),
        missing_dep: "ghost".into(),
    }));
    assert!(report.circular.is_empty());
}

/// A deferred registration succeeds once it is retried after its dependency exists.
#[test]
fn test_deferred_then_successful_registration() {
    let mut registry = ModuleRegistry::new();

    assert!(!registry.register("a", |_| Ok(Some(ModuleInstance::new(1u8))), &["b"]));
    assert!(!registry.is_module_ready("a"));
    assert_eq!(registry.module_info("a").unwrap().pending_dependencies, vec!["b"]);

    assert!(registry.register("b", |_| Ok(Some(ModuleInstance::new(2u8))), &[]));
    assert!(registry.register("a", |_| Ok(Some(ModuleInstance::new(1u8))), &["b"]));
    assert!(registry.module_info("a").unwrap().pending_dependencies.is_empty());

    assert!(registry.get_module("a").is_some());
    assert!(registry.is_module_ready("b"));
}

/// Teardown runs in exactly the reverse of the realized initialization order.
#[test]
fn test_teardown_in_reverse_initialization_order() {
    let log = CallLog::new();
    let (mut registry, _mocks) = chain_with_log(&log);
    registry.initialize_all();
    log.clear();

    registry.cleanup();

    assert_eq!(log.events(), ["dispose:c", "dispose:b", "dispose:a"]);
    for name in ["a", "b", "c"] {
        assert_eq!(registry.status(name), Some(ModuleStatus::Destroyed));
        assert!(!registry.is_module_ready(name));
    }
    assert!(registry.load_order().is_empty());
    assert_eq!(registry.errors().count(), 0);
}

/// Independent modules are torn down by first-request order, not declaration order.
#[test]
fn test_teardown_follows_request_order_not_declaration() {
    let log = CallLog::new();
    let mut first = MockFactory::with_log("declared_first", &log);
    let mut second = MockFactory::with_log("declared_second", &log);
    first.expect_call().return_recorder();
    second.expect_call().return_recorder();

    let mut registry = ModuleRegistry::new();
    registry.register("declared_first", first.factory(), &[]);
    registry.register("declared_second", second.factory(), &[]);

    registry.get_module("declared_second");
    registry.get_module("declared_first");
    registry.cleanup();

    assert!(log.position("dispose:declared_first") < log.position("dispose:declared_second"));
}

/// Replacing an initialized dependency disposes it and its dependents, and the rebuilt
/// modules are still torn down dependents first.
#[test]
fn test_replacing_initialized_dependency_keeps_teardown_order() {
    let log = CallLog::new();
    let mut dom = MockFactory::with_log("dom", &log);
    let mut ui = MockFactory::with_log("ui", &log);
    dom.expect_call().return_recorder();
    dom.expect_call().return_recorder();
    ui.expect_call().return_recorder();
    ui.expect_call().return_recorder();

    let mut registry = ModuleRegistry::new();
    registry.register("dom", dom.factory(), &[]);
    registry.register("ui", ui.factory(), &["dom"]);
    let stale = registry.get_module("ui").unwrap();

    assert!(registry.register("dom", dom.factory(), &[]));

    assert_eq!(log.events(), ["init:dom", "init:ui", "dispose:ui", "dispose:dom"]);
    assert_eq!(registry.status("dom"), Some(ModuleStatus::Registered));
    assert_eq!(registry.status("ui"), Some(ModuleStatus::Registered));
    assert!(!registry.is_module_ready("ui"));
    assert!(registry.load_order().is_empty());

    let rebuilt = registry.get_module("ui").unwrap();
    assert!(!stale.ptr_eq(&rebuilt));
    assert_eq!(registry.load_order(), ["dom", "ui"]);
    log.clear();

    registry.cleanup();

    assert_eq!(log.events(), ["dispose:ui", "dispose:dom"]);
    dom.verify();
    ui.verify();
}

#[test]
fn test_failing_teardown_does_not_stop_cleanup() {
    let log = CallLog::new();
    let mut a = MockFactory::with_log("a", &log);
    let mut b = MockFactory::with_log("b", &log);
    let mut c = MockFactory::with_log("c", &log);
    a.expect_call().return_recorder();
    b.expect_call().return_failing_recorder("listener still attached");
    c.expect_call().return_recorder();

    let mut registry = ModuleRegistry::new();
    registry.register("a", a.factory(), &[]);
    registry.register("b", b.factory(), &["a"]);
    registry.register("c", c.factory(), &["b"]);
    registry.initialize_all();

    registry.cleanup();

    assert_eq!(&log.events()[3..], ["dispose:c", "dispose:b", "dispose:a"]);
    assert_eq!(registry.status("b"), Some(ModuleStatus::Destroyed));
}

/// Factory errors and panics are contained: the module fails, nothing escapes.
#[test]
fn test_factory_failures_are_contained() {
    let mut erroring = MockFactory::new("save_system");
    let mut panicking = MockFactory::new("particles");
    let mut healthy = MockFactory::new("ui");
    erroring.expect_call().return_err("storage unavailable");
    panicking.expect_call().panics("canvas missing");
    healthy.expect_call().return_recorder();

    let mut registry = ModuleRegistry::new();
    registry.register("save_system", erroring.factory(), &[]);
    registry.register("particles", panicking.factory(), &[]);
    registry.register("ui", healthy.factory(), &[]);
    registry.register("story", |_| Ok(Some(ModuleInstance::new(()))), &["save_system"]);

    let summary = registry.initialize_all();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed(), 3);

    assert!(registry.get_module("save_system").is_none());
    assert!(registry.get_module("particles").is_none());
    assert_eq!(registry.status("save_system"), Some(ModuleStatus::Failed));
    assert_eq!(registry.status("story"), Some(ModuleStatus::Failed));

    let errors: Vec<(&str, &ModuleError)> = registry.errors().collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0].1, ModuleError::Factory { .. }));
    assert_eq!(
        errors[1].1.to_string(),
        "Factory for particles panicked: canvas missing"
    );
    assert!(matches!(errors[2].1, ModuleError::DependencyResolution { .. }));
    assert_eq!(registry.stats().failed, 3);
}

struct DomElements {
    root: &'static str,
}

struct Ui {
    dom: Arc<DomElements>,
}

#[test]
fn test_idle_game_boot_scenario() {
    let mut registry = ModuleRegistry::new();

    assert!(registry.register(
        "domElements",
        |_| Ok(Some(ModuleInstance::new(DomElements { root: "#game" }))),
        &[],
    ));

    let ui_factory = |deps: &Dependencies| -> FactoryResult {
        let dom = deps.require::<DomElements>("domElements")?;
        Ok(Some(ModuleInstance::new(Ui { dom })))
    };
    assert!(registry.register("ui", ui_factory, &["domElements"]));

    let ui = registry.get_module("ui").expect("ui should initialize");
    let ui = ui.downcast::<Ui>().expect("ui instance");
    let dom = registry
        .get_module("domElements")
        .and_then(|instance| instance.downcast::<DomElements>())
        .expect("dom instance");
    assert!(Arc::ptr_eq(&ui.dom, &dom));
    assert_eq!(ui.dom.root, "#game");

    // a fresh registry: buildings arrives before ui
    let mut registry = ModuleRegistry::new();
    registry.register(
        "domElements",
        |_| Ok(Some(ModuleInstance::new(DomElements { root: "#game" }))),
        &[],
    );
    let buildings = |_: &Dependencies| -> FactoryResult { Ok(Some(ModuleInstance::new("buildings"))) };
    assert!(!registry.register("buildings", buildings, &["ui"]));
    assert!(registry.register("ui", ui_factory, &["domElements"]));
    assert!(registry.register("buildings", buildings, &["ui"]));

    let summary = registry.initialize_all();
    assert_eq!(summary.successful, 3);
    assert_eq!(summary.total, 3);
    assert!(summary.all_succeeded());
    assert!(registry.validate_dependencies().valid);
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let mut registry = ModuleRegistry::builder()
        .external("dom", ModuleInstance::new(()))
        .build();
    registry.register("ui", |_| Ok(Some(ModuleInstance::new(()))), &["dom"]);
    registry.register("story", |_| Ok(None), &["ui"]);
    registry.initialize_all();

    let info = serde_json::to_value(registry.modules_info()).unwrap();
    assert_eq!(info[0]["name"], "ui");
    assert_eq!(info[0]["status"], "initialized");
    assert_eq!(info[0]["has_instance"], true);
    assert_eq!(info[1]["status"], "failed");
    assert_eq!(info[1]["error"], "Factory for story returned no instance");

    let graph = serde_json::to_value(registry.dependency_graph()).unwrap();
    assert_eq!(graph["ui"]["dependents"][0], "story");
    assert_eq!(graph["ui"]["dependencies"][0], "dom");

    let stats = serde_json::to_value(registry.stats()).unwrap();
    assert_eq!(stats["registered"], 2);
    assert_eq!(stats["initialized"], 1);
    assert_eq!(stats["failed"], 1);
}
