//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn clipwatch_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clipwatch"));
    cmd.env_remove("CLIPWATCH_BACKEND")
        .env_remove("CLIPWATCH_POLL_INTERVAL_MS")
        .env_remove("RUST_LOG");
    cmd
}

/// Binary with its config directory redirected into `dir`
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = clipwatch_bin();
    cmd.env("XDG_CONFIG_HOME", dir.path()).env("HOME", dir.path());
    cmd
}

#[test]
fn help_output() {
    clipwatch_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clipboard"))
        .stdout(predicate::str::contains("--backend"))
        .stdout(predicate::str::contains("--interval"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn version_output() {
    clipwatch_bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("clipwatch"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_help() {
    clipwatch_bin()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_path_command() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clipwatch"))
        .stdout(predicate::str::contains("config.toml"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_init_set_get_list() {
    let dir = TempDir::new().unwrap();

    isolated(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("clipwatch").join("config.toml").exists());

    isolated(&dir)
        .args(["config", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    isolated(&dir)
        .args(["config", "set", "backend", "generic"])
        .assert()
        .success();

    isolated(&dir)
        .args(["config", "get", "backend"])
        .assert()
        .success()
        .stdout(predicate::str::diff("polling\n"));

    isolated(&dir)
        .args(["config", "set", "linux.tool_timeout_ms", "400"])
        .assert()
        .success();

    isolated(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("poll_interval_ms"))
        .stdout(predicate::str::contains("400"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_get_unset_key() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["config", "get", "preview_chars"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn probe_reports_environment() {
    clipwatch_bin()
        .args(["probe", "--backend", "polling"])
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("DISPLAY")
        .assert()
        .stdout(predicate::str::contains("environment"))
        .stdout(predicate::str::contains("backend"));
}

#[test]
fn probe_json_is_parseable() {
    let output = clipwatch_bin()
        .args(["probe", "--json", "--backend", "polling"])
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("DISPLAY")
        .output()
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("probe --json should print JSON");
    assert_eq!(value["preference"], "polling");
    assert!(value.get("environment").is_some());
}

#[cfg(target_os = "linux")]
#[test]
fn probe_prefers_wayland_signal() {
    clipwatch_bin()
        .args(["probe", "--json"])
        .env("WAYLAND_DISPLAY", "wayland-test")
        .env("DISPLAY", ":0")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"environment\":\"wayland\""))
        .stdout(predicate::str::contains("\"backend\":\"wayland\""));
}

#[cfg(not(target_os = "linux"))]
#[test]
fn probe_rejects_x11_off_linux() {
    clipwatch_bin()
        .args(["probe", "--backend", "x11"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unavailable"));
}

#[cfg(target_os = "linux")]
#[test]
fn backend_env_var_is_honored() {
    clipwatch_bin()
        .args(["probe", "--json"])
        .env("CLIPWATCH_BACKEND", "polling")
        .assert()
        .stdout(predicate::str::contains("\"preference\":\"polling\""));
}
