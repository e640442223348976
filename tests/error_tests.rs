//! Error scenario integration tests

use std::process::Command;

fn clipwatch_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clipwatch"));
    cmd.env_remove("CLIPWATCH_BACKEND")
        .env_remove("CLIPWATCH_POLL_INTERVAL_MS");
    cmd
}

#[test]
fn config_get_unknown_key() {
    let output = clipwatch_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown key") || stderr.contains("unknown_key"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_backend() {
    let dir = tempfile::tempdir().unwrap();
    let output = clipwatch_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .args(["config", "set", "backend", "quartz"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("quartz"),
        "Expected the rejected value in the error, got: {}",
        stderr
    );
}

#[test]
fn config_set_out_of_range_interval() {
    let dir = tempfile::tempdir().unwrap();
    let output = clipwatch_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .args(["config", "set", "poll_interval_ms", "5"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("poll_interval_ms"), "got: {}", stderr);
}

#[test]
fn invalid_backend_flag_is_usage_error() {
    let output = clipwatch_bin()
        .args(["--backend", "quartz"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("quartz"));
}

#[test]
fn invalid_interval_is_usage_error() {
    let output = clipwatch_bin()
        .args(["--interval", "soon"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = clipwatch_bin()
        .arg("history")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[cfg(target_os = "linux")]
#[test]
fn windows_backend_unavailable_on_linux() {
    let output = clipwatch_bin()
        .args(["snapshot", "--backend", "windows"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("windows backend is not available"),
        "got: {}",
        stderr
    );
}
