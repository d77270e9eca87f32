//! CLI argument parsing tests for Amplifier Beads

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn beads() -> Command {
    Command::new(env!("CARGO_BIN_EXE_amplifier-beads"))
}

#[test]
fn test_help_flag() {
    let mut cmd = beads();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Beads issue tracking for agent sessions"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_version_flag() {
    let mut cmd = beads();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_no_args_shows_help() {
    let mut cmd = beads();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_subcommand() {
    let mut cmd = beads();
    cmd.arg("engage");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ============================================================================
// Subcommand help
// ============================================================================

#[test]
fn test_subcommands_listed() {
    let mut cmd = beads();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("ready"))
        .stdout(predicate::str::contains("tool"))
        .stdout(predicate::str::contains("session-end"))
        .stdout(predicate::str::contains("remind"));
}

#[test]
fn test_tool_help() {
    let mut cmd = beads();
    cmd.args(["tool", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Tool arguments as JSON"))
        .stdout(predicate::str::contains("-s, --session"));
}

#[test]
fn test_tool_requires_args() {
    let mut cmd = beads();
    cmd.arg("tool");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("<ARGS>"));
}

#[test]
fn test_session_end_requires_session() {
    let mut cmd = beads();
    cmd.arg("session-end");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--session"));
}

#[test]
fn test_remind_help() {
    let mut cmd = beads();
    cmd.args(["remind", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("-t, --tools"))
        .stdout(predicate::str::contains("Comma-separated tool names"));
}

#[test]
fn test_global_flags_after_subcommand() {
    let env = common::TestEnv::new().unwrap();
    let mut cmd = beads();
    cmd.env("HOME", env.temp_dir.path());
    cmd.args(["config", "--verbose", "--config"])
        .arg(env.config_file());
    cmd.assert().success();
}
