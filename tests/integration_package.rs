//! Integration tests for registration and resolution through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use modpack::test_utils::{ManifestFixture, init_test_logging};
use modpack::{
    LoadOverrides, MAIN_MODULE, NameSpec, Package, PackageConfig, PackageError, UnitState, names,
};

fn recording(package: &Package, log: &Rc<RefCell<Vec<String>>>, name: &str, deps: NameSpec) {
    let log = Rc::clone(log);
    package
        .define(name, deps, move |unit, _| {
            log.borrow_mut().push(unit.name().to_string());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_needs_is_idempotent() {
    init_test_logging(None);
    let package = Package::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    package
        .define("x", (), move |_, _| {
            counter.set(counter.get() + 1);
            Ok(String::from("value"))
        })
        .unwrap();

    let first = package.needs_as::<String>("x").unwrap();
    let second = package.needs_as::<String>("x").unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_duplicate_registration_keeps_first() {
    let package = Package::new();
    package.define("foo", (), |_, _| Ok(1_u8)).unwrap();

    let err = package.define("foo", (), |_, _| Ok(2_u8)).unwrap_err();
    assert!(matches!(err, PackageError::DuplicateModule { ref name } if name == "foo"));
    assert_eq!(*package.needs_as::<u8>("foo").unwrap(), 1);
}

#[test]
fn test_unwrap_rule() {
    let package = Package::new();
    package.define("foo", (), |_, _| Ok(1_i32)).unwrap();
    package.define("bar", (), |_, _| Ok(2_i32)).unwrap();

    assert_eq!(*package.needs("foo").unwrap().get::<i32>().unwrap(), 1);

    for spec in [NameSpec::from("foo bar"), names!["foo", "bar"]] {
        let map = package.needs(spec).unwrap().into_map().unwrap();
        assert_eq!(map.names().collect::<Vec<_>>(), ["foo", "bar"]);
        assert_eq!(*map.get::<i32>("bar").unwrap(), 2);
    }
}

#[test]
fn test_namespace_request_returns_map() {
    let package = Package::new();
    package.define("db/pool", (), |_, _| Ok("pool")).unwrap();

    let map = package.needs("db: pool").unwrap().into_map().unwrap();
    assert!(map.contains("db/pool"));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_cycle_names_repeated_entries() {
    let package = Package::new();
    package.declare("foo", "bar").unwrap();
    package.declare("bar", "qux").unwrap();
    package.declare("qux", "foo bar").unwrap();

    match package.needs("qux").unwrap_err() {
        PackageError::CircularDependency { duplicates, chain } => {
            assert_eq!(duplicates, ["qux"]);
            assert_eq!(chain, ["qux", "foo", "bar", "qux"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }

    assert!(package.loading_stack().is_empty());
    assert!(!package.is_loaded("qux"));
}

#[test]
fn test_main_runs_on_registration() {
    let package = Package::new();
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    package
        .define(MAIN_MODULE, (), move |_, _| {
            flag.set(true);
            Ok(())
        })
        .unwrap();

    assert!(ran.get());
    assert!(matches!(package.get_unit(MAIN_MODULE).unwrap().state(), UnitState::Cached(_)));
}

#[test]
fn test_dependencies_resolve_before_dependents() {
    let package = Package::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    recording(&package, &log, "shared", NameSpec::none());
    recording(&package, &log, "b", "shared".into());
    recording(&package, &log, "a", "shared".into());
    recording(&package, &log, MAIN_MODULE, "a b".into());

    assert_eq!(*log.borrow(), ["shared", "a", "b", "main"]);
}

#[test]
fn test_runtime_order_matches_graph_order() {
    let package = Package::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    recording(&package, &log, "app/server", "app: config db".into());
    recording(&package, &log, "app/config", NameSpec::none());
    recording(&package, &log, "app/db", "app/config".into());
    recording(&package, &log, "cli", "app/server".into());

    let planned = package.graph().load_order_for(&["cli".to_string()]).unwrap();
    package.run("cli").unwrap();

    assert_eq!(*log.borrow(), planned);
}

#[test]
fn test_failed_definition_retries_from_scratch() {
    let package = Package::new();
    let ready = Rc::new(Cell::new(false));
    let dep_calls = Rc::new(Cell::new(0));

    let counter = Rc::clone(&dep_calls);
    package
        .define("settings", (), move |_, _| {
            counter.set(counter.get() + 1);
            Ok(8080_u16)
        })
        .unwrap();

    let gate = Rc::clone(&ready);
    package
        .define("server", "settings", move |_, deps| {
            anyhow::ensure!(gate.get(), "port not ready");
            Ok(format!("listening on {}", deps.get::<u16>(0)?))
        })
        .unwrap();

    let err = package.needs("server").unwrap_err();
    assert!(matches!(err, PackageError::DefinitionFailed { ref name, .. } if name == "server"));
    assert!(!package.is_loaded("server"));
    assert!(package.is_loaded("settings"));

    ready.set(true);
    let value = package.needs_as::<String>("server").unwrap();
    assert_eq!(value.as_str(), "listening on 8080");
    assert_eq!(dep_calls.get(), 1);
}

#[test]
fn test_definitions_can_request_undeclared_modules() {
    let package = Package::new();
    package.define("greeting", (), |_, _| Ok("hi".to_string())).unwrap();
    package
        .define("shout", (), |unit, _| {
            let greeting = unit.needs_as::<String>("greeting")?;
            Ok(greeting.to_uppercase())
        })
        .unwrap();

    assert_eq!(package.needs_as::<String>("shout").unwrap().as_str(), "HI");
}

#[test]
fn test_not_found_suggestions() {
    let package = Package::new();
    package.declare("Config", ()).unwrap();
    package.declare("server", ()).unwrap();

    match package.needs("config").unwrap_err() {
        PackageError::ModuleNotFound { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("Config"));
        }
        other => panic!("expected not found, got {other:?}"),
    }

    match package.needs("sever").unwrap_err() {
        PackageError::ModuleNotFound { suggestion, similar, .. } => {
            assert!(suggestion.is_none());
            assert_eq!(similar, ["server"]);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn test_config_applies_only_to_later_registrations() {
    let package = Package::new();
    package.declare("before", ()).unwrap();
    package.config(LoadOverrides::new().log_on_load(true));
    package.declare("after", ()).unwrap();

    assert!(!package.get_unit("before").unwrap().options().log_on_load);
    assert!(package.get_unit("after").unwrap().options().log_on_load);
}

#[test]
fn test_load_now_override() {
    let package = Package::new();
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    package
        .define_with("warmup", (), LoadOverrides::new().load_now(true), move |_, _| {
            flag.set(true);
            Ok(())
        })
        .unwrap();

    assert!(ran.get());
}

#[test]
fn test_invalid_names_are_rejected() {
    let package = Package::new();
    assert!(matches!(
        package.declare("", ()),
        Err(PackageError::InvalidName { .. })
    ));
    assert!(matches!(
        package.declare("two words", ()),
        Err(PackageError::InvalidName { .. })
    ));
    assert!(matches!(
        package.declare("ok", "dangling:"),
        Err(PackageError::InvalidDefinition { .. })
    ));
    assert!(!package.exists("ok"));
}

#[test]
fn test_manifest_into_package() {
    let config = PackageConfig::from_toml_str(&ManifestFixture::basic().content).unwrap();
    let package = config.into_package().unwrap();

    for name in ["main", "app/config", "app/server", "db/pool", "db/url"] {
        assert!(package.is_loaded(name), "{name} should be loaded");
    }
    assert_eq!(package.load_count(), 1);
}

#[test]
fn test_manifest_with_cycle_fails_on_first_request() {
    let config = PackageConfig::from_toml_str(&ManifestFixture::cyclic().content).unwrap();
    let package = config.into_package().unwrap();

    let err = package.needs("foo").unwrap_err();
    assert!(err.is_circular());
    assert!(package.loading_stack().is_empty());
}
