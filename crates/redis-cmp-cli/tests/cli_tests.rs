//! CLI integration tests for redis-cmp.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions that need no running server.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the redis-cmp binary.
fn cmd() -> Command {
    Command::cargo_bin("redis-cmp").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_server_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--server1"))
        .stdout(predicate::str::contains("--server2"))
        .stdout(predicate::str::contains("redis-cmp --server1 redis://"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("redis-cmp"));
}

#[test]
fn test_scan_flags_have_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--scan-count"))
        .stdout(predicate::str::contains("[default: 5000]"))
        .stdout(predicate::str::contains("--read-timeout"))
        .stdout(predicate::str::contains("[default: 120]"))
        .stdout(predicate::str::contains("--max-workers"))
        .stdout(predicate::str::contains("--legacy-ranges"));
}

#[test]
fn test_logging_flags_exist() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

// =============================================================================
// Argument Errors
// =============================================================================

#[test]
fn test_missing_servers_fails() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--server1"));
}

#[test]
fn test_missing_target_fails() {
    cmd()
        .args(["--server1", "redis://localhost:6379/0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--server2"));
}

#[test]
fn test_non_numeric_scan_count_fails() {
    cmd()
        .args([
            "--server1",
            "redis://localhost:6379/0",
            "--server2",
            "redis://localhost:6380/0",
            "--scan-count",
            "lots",
        ])
        .assert()
        .failure();
}

// =============================================================================
// Configuration Errors (exit code 1, no server contacted)
// =============================================================================

#[test]
fn test_invalid_scheme_exits_with_config_error() {
    cmd()
        .args([
            "--server1",
            "http://:secret@localhost:6379",
            "--server2",
            "redis://localhost:6380/0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("source.url"))
        .stderr(predicate::str::contains("secret").not());
}

#[test]
fn test_zero_scan_count_exits_with_config_error() {
    cmd()
        .args([
            "--server1",
            "redis://localhost:6379/0",
            "--server2",
            "redis://localhost:6380/0",
            "--scan-count",
            "0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("scan_count"));
}

#[test]
fn test_zero_max_workers_exits_with_config_error() {
    cmd()
        .args([
            "--server1",
            "redis://localhost:6379/0",
            "--server2",
            "redis://localhost:6380/0",
            "--max-workers",
            "0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_workers"));
}

#[test]
fn test_unknown_log_format_exits_with_config_error() {
    cmd()
        .args([
            "--server1",
            "redis://localhost:6379/0",
            "--server2",
            "redis://localhost:6380/0",
            "--log-format",
            "yaml",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown log format"));
}

// =============================================================================
// Connection Errors
// =============================================================================

#[test]
fn test_unreachable_server_exits_with_connection_error() {
    // Port 1 on loopback is closed; the connection is refused or times out.
    cmd()
        .args([
            "--server1",
            "redis://127.0.0.1:1/0",
            "--server2",
            "redis://127.0.0.1:1/1",
            "--read-timeout",
            "2",
        ])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Connection to"));
}
