//! Integration tests for the `modpack` binary.

use assert_cmd::Command;
use modpack::test_utils::ManifestFixture;
use predicates::prelude::*;
use tempfile::TempDir;

fn modpack() -> Command {
    Command::cargo_bin("modpack").unwrap()
}

#[test]
fn test_check_valid_manifest() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::basic().write_to(temp.path()).unwrap();

    modpack()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 modules"))
        .stdout(predicate::str::contains("1 loaded on registration"));
}

#[test]
fn test_check_reports_cycle() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::cyclic().write_to(temp.path()).unwrap();

    modpack()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Circular dependency detected"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_check_reports_undeclared_dependency() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::missing_dependency().write_to(temp.path()).unwrap();

    modpack()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("undeclared modules: Config"));
}

#[test]
fn test_check_invalid_toml() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::invalid_syntax().write_to(temp.path()).unwrap();

    modpack()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_check_missing_file() {
    let temp = TempDir::new().unwrap();

    modpack()
        .arg("check")
        .arg(temp.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read manifest"))
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn test_order_for_requested_names() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::lazy().write_to(temp.path()).unwrap();

    modpack()
        .arg("order")
        .arg(&path)
        .arg("a")
        .assert()
        .success()
        .stdout("  1. c\n  2. b\n  3. a\n");
}

#[test]
fn test_order_expands_namespaces() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::basic().write_to(temp.path()).unwrap();

    modpack()
        .args(["order"])
        .arg(&path)
        .arg("db: pool")
        .assert()
        .success()
        .stdout("  1. db/url\n  2. db/pool\n");
}

#[test]
fn test_order_all_modules_lists_dependencies_first() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::lazy().write_to(temp.path()).unwrap();

    let output = modpack().arg("order").arg(&path).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let position = |name: &str| stdout.find(&format!(". {name}\n")).unwrap();
    assert!(position("c") < position("b"));
    assert!(position("b") < position("a"));
    assert!(stdout.contains(". d\n"));
}

#[test]
fn test_tree_shows_nested_dependencies() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::basic().write_to(temp.path()).unwrap();

    modpack()
        .arg("tree")
        .arg(&path)
        .arg("main")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("main\n"))
        .stdout(predicate::str::contains("app/server"))
        .stdout(predicate::str::contains("db/url"));
}

#[test]
fn test_tree_unknown_root() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::basic().write_to(temp.path()).unwrap();

    modpack()
        .arg("tree")
        .arg(&path)
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nope' is not declared"));
}

#[test]
fn test_run_executes_main_on_registration() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::basic().write_to(temp.path()).unwrap();

    modpack()
        .arg("--quiet")
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "app/config\n→ db/url\n→ db/pool\n→ app/server\n→ main\n",
        ))
        .stdout(predicate::str::contains("5 modules loaded, resolution requests: 1"));
}

#[test]
fn test_run_requested_names_only() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::lazy().write_to(temp.path()).unwrap();

    modpack()
        .args(["-q", "run"])
        .arg(&path)
        .arg("b")
        .assert()
        .success()
        .stdout(predicate::str::contains("→ c\n→ b\n"))
        .stdout(predicate::str::contains("→ a").not())
        .stdout(predicate::str::contains("2 modules loaded"));
}

#[test]
fn test_run_reports_case_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::missing_dependency().write_to(temp.path()).unwrap();

    modpack()
        .args(["-q", "run"])
        .arg(&path)
        .arg("app")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'Config' is not defined"))
        .stderr(predicate::str::contains("use 'config'"));
}

#[test]
fn test_run_reports_cycle_chain() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::cyclic().write_to(temp.path()).unwrap();

    modpack()
        .args(["-q", "run"])
        .arg(&path)
        .arg("qux")
        .assert()
        .failure()
        .stderr(predicate::str::contains("qux -> foo -> bar -> qux"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let temp = TempDir::new().unwrap();
    let path = ManifestFixture::lazy().write_to(temp.path()).unwrap();

    modpack()
        .env_remove("RUST_LOG")
        .args(["--verbose", "run"])
        .arg(&path)
        .arg("c")
        .assert()
        .success()
        .stderr(predicate::str::contains("Registered module 'c'"));
}

#[test]
fn test_load_notifications_fire_once() {
    let temp = TempDir::new().unwrap();
    let fixture = ManifestFixture::new(
        "notify",
        r#"
[defaults]
log_on_load = true
log_after_load = true

[modules]
app = ["config"]
config = []
"#,
    );
    let path = fixture.write_to(temp.path()).unwrap();

    let output = modpack()
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("run")
        .arg(&path)
        .args(["app", "config"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    for name in ["config", "app"] {
        let loading = format!("Loading module '{name}'");
        let finished = format!("Finished loading module '{name}'");
        assert_eq!(stderr.matches(&loading).count(), 1, "{stderr}");
        assert_eq!(stderr.matches(&finished).count(), 1, "{stderr}");
        assert!(stderr.find(&loading).unwrap() < stderr.find(&finished).unwrap());
    }

    let app_loading = stderr.find("Loading module 'app'").unwrap();
    let config_finished = stderr.find("Finished loading module 'config'").unwrap();
    let app_finished = stderr.find("Finished loading module 'app'").unwrap();
    assert!(app_loading < config_finished);
    assert!(config_finished < app_finished);
}

#[test]
fn test_load_notifications_silent_when_quiet() {
    let temp = TempDir::new().unwrap();
    let fixture = ManifestFixture::new(
        "notify",
        "[defaults]\nlog_on_load = true\n\n[modules]\nsolo = []\n",
    );
    let path = fixture.write_to(temp.path()).unwrap();

    modpack()
        .env_remove("RUST_LOG")
        .args(["-q", "run"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading module").not());
}

#[test]
fn test_run_eager_modules_in_dependency_order() {
    let temp = TempDir::new().unwrap();
    let fixture = ManifestFixture::new(
        "eager",
        "[modules]\nmain = [\"server\"]\nserver = { load_now = true }\n",
    );
    let path = fixture.write_to(temp.path()).unwrap();

    modpack()
        .args(["-q", "run"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("→ server\n→ main\n"))
        .stdout(predicate::str::contains("2 modules loaded"));
}
