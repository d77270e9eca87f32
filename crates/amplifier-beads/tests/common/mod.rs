//! Common test utilities for Amplifier Beads integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Fake `bd` answering every subcommand the module uses.
///
/// Each invocation is appended to `calls.log` next to the script.
pub const FAKE_BD: &str = r#"echo "$*" >> "$(dirname "$0")/calls.log"
case "$1" in
  ready) echo '[{"id":"bd-1","title":"Ready task","priority":1},{"id":"bd-2","title":"Other task"}]' ;;
  list) echo '[{"id":"bd-7","title":"Active task","status":"in_progress","notes":"[amplifier:claimed-by-session:s1]"},{"id":"bd-8","title":"Someone else","status":"in_progress","notes":"[amplifier:claimed-by-session:s2]"}]' ;;
  update) echo "{\"id\":\"$2\",\"status\":\"in_progress\"}" ;;
  show) echo 'bd-1: plain text' ;;
  *) echo '{}' ;;
esac"#;

/// Create a test environment with isolated home and config directory
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let config_dir = temp_dir.path().join(".amplifier");
        let bin_dir = temp_dir.path().join("bin");

        std::fs::create_dir_all(&config_dir)?;
        std::fs::create_dir_all(&bin_dir)?;

        Ok(Self {
            temp_dir,
            config_dir,
            bin_dir,
        })
    }

    /// Config file used by `command()`
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("beads.json")
    }

    /// Log of fake `bd` invocations
    pub fn calls_log(&self) -> String {
        std::fs::read_to_string(self.bin_dir.join("calls.log")).unwrap_or_default()
    }

    /// Create a command pointed at this environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_amplifier-beads"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("AMPLIFIER_BEADS_CONFIG");
        cmd.arg("--config").arg(self.config_file());
        cmd
    }

    /// Write a config file with the given JSON
    pub fn write_config(&self, json: &str) -> anyhow::Result<()> {
        std::fs::write(self.config_file(), json)?;
        Ok(())
    }

    /// Point the config at a `bd` that does not exist
    pub fn without_bd(&self) -> anyhow::Result<()> {
        self.write_config(r#"{"tracker": {"program": "bd-not-installed-anywhere"}}"#)
    }

    /// Install the fake `bd` and point the config at it
    #[cfg(unix)]
    pub fn with_fake_bd(&self, reminder_interval: u32) -> anyhow::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.bin_dir.join("bd");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", FAKE_BD))?;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)?;

        let config = serde_json::json!({
            "reminder": { "reminderInterval": reminder_interval },
            "tracker": { "program": path.to_string_lossy() }
        });
        self.write_config(&config.to_string())?;
        Ok(path)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
