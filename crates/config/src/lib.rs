//! Configuration for the beads module
//!
//! Typed sections for the workflow reminder, the lifecycle hooks and the `bd`
//! client. Every field is optional on disk and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("◆ CONFIG IO ERROR: {0}")]
    Io(#[from] std::io::Error),

    #[error("◆ CONFIG PARSE ERROR: {0}")]
    Json(#[from] serde_json::Error),

    #[error("◆ CONFIG NOT FOUND: {0}")]
    NotFound(PathBuf),

    #[error("◆ INVALID CONFIG `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Workflow reminder options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Size of the recent tool-call window
    #[serde(default = "default_recent_tool_threshold", alias = "recentToolThreshold")]
    pub recent_tool_threshold: usize,
    /// Tool calls required between two reminders
    #[serde(default = "default_reminder_interval", alias = "reminderInterval")]
    pub reminder_interval: u32,
    #[serde(default = "default_max_displayed_items", alias = "maxDisplayedItems")]
    pub max_displayed_items: usize,
    /// Tool whose recent use suppresses the reminder
    #[serde(default = "default_tracked_tool", alias = "trackedTool")]
    pub tracked_tool: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recent_tool_threshold: default_recent_tool_threshold(),
            reminder_interval: default_reminder_interval(),
            max_displayed_items: default_max_displayed_items(),
            tracked_tool: default_tracked_tool(),
        }
    }
}

impl ReminderConfig {
    /// Reject values that would make the scheduler meaningless
    pub fn validate(&self) -> Result<()> {
        if self.recent_tool_threshold == 0 {
            return Err(invalid("reminder.recent_tool_threshold", "must be at least 1"));
        }
        if self.reminder_interval == 0 {
            return Err(invalid("reminder.reminder_interval", "must be at least 1"));
        }
        if self.max_displayed_items == 0 {
            return Err(invalid("reminder.max_displayed_items", "must be at least 1"));
        }
        if self.tracked_tool.trim().is_empty() {
            return Err(invalid("reminder.tracked_tool", "must not be empty"));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_recent_tool_threshold() -> usize {
    5
}

fn default_reminder_interval() -> u32 {
    8
}

fn default_max_displayed_items() -> usize {
    3
}

fn default_tracked_tool() -> String {
    "beads".to_string()
}

/// Lifecycle hook options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Inject `bd ready` output at session start
    #[serde(default = "default_true", alias = "injectReady")]
    pub inject_ready: bool,
    #[serde(default = "default_max_ready_items", alias = "maxReadyItems")]
    pub max_ready_items: usize,
    /// Mark issues claimed by the session when it ends
    #[serde(default = "default_true", alias = "annotateSessionEnd")]
    pub annotate_session_end: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            inject_ready: true,
            max_ready_items: default_max_ready_items(),
            annotate_session_end: true,
        }
    }
}

fn default_max_ready_items() -> usize {
    10
}

/// `bd` process options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Timeout for calls made by the tool
    #[serde(default = "default_tool_timeout", alias = "toolTimeoutSecs")]
    pub tool_timeout_secs: u64,
    /// Timeout for calls made from lifecycle hooks
    #[serde(default = "default_hook_timeout", alias = "hookTimeoutSecs")]
    pub hook_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "workingDir")]
    pub working_dir: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            tool_timeout_secs: default_tool_timeout(),
            hook_timeout_secs: default_hook_timeout(),
            working_dir: None,
        }
    }
}

impl TrackerConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_secs)
    }
}

fn default_program() -> String {
    "bd".to_string()
}

fn default_tool_timeout() -> u64 {
    30
}

fn default_hook_timeout() -> u64 {
    10
}

/// Root module configuration.
///
/// Reminder options are read from the `reminder` section and from the root
/// object; root keys win. Unknown root keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "ConfigFile")]
pub struct Config {
    pub reminder: ReminderConfig,
    pub hooks: HooksConfig,
    pub tracker: TrackerConfig,
}

/// On-disk shape of [`Config`]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    reminder: ReminderConfig,
    #[serde(default)]
    hooks: HooksConfig,
    #[serde(default)]
    tracker: TrackerConfig,
    enabled: Option<bool>,
    #[serde(alias = "recentToolThreshold")]
    recent_tool_threshold: Option<usize>,
    #[serde(alias = "reminderInterval")]
    reminder_interval: Option<u32>,
    #[serde(alias = "maxDisplayedItems")]
    max_displayed_items: Option<usize>,
    #[serde(alias = "trackedTool")]
    tracked_tool: Option<String>,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let mut reminder = file.reminder;
        if let Some(enabled) = file.enabled {
            reminder.enabled = enabled;
        }
        if let Some(threshold) = file.recent_tool_threshold {
            reminder.recent_tool_threshold = threshold;
        }
        if let Some(interval) = file.reminder_interval {
            reminder.reminder_interval = interval;
        }
        if let Some(max) = file.max_displayed_items {
            reminder.max_displayed_items = max;
        }
        if let Some(tool) = file.tracked_tool {
            reminder.tracked_tool = tool;
        }

        Self {
            reminder,
            hooks: file.hooks,
            tracker: file.tracker,
        }
    }
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("◆ NO CONFIG AT {:?}, USING DEFAULTS", path);
            return Ok(Config::default());
        }

        debug!("◆ READING CONFIG FROM {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a path that must exist
    pub async fn load_required(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load_from(path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("◆ WRITING CONFIG TO {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.reminder.validate()?;

        if self.hooks.max_ready_items == 0 {
            return Err(invalid("hooks.max_ready_items", "must be at least 1"));
        }
        if self.tracker.program.trim().is_empty() {
            return Err(invalid("tracker.program", "must not be empty"));
        }
        if self.tracker.tool_timeout_secs == 0 {
            return Err(invalid("tracker.tool_timeout_secs", "must be at least 1"));
        }
        if self.tracker.hook_timeout_secs == 0 {
            return Err(invalid("tracker.hook_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Working directory for `bd`, if pinned
    pub fn working_dir(&self) -> Option<PathBuf> {
        self.tracker.working_dir.as_ref().map(PathBuf::from)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Write a default config file unless one already exists
pub async fn init_at(path: &Path) -> Result<Config> {
    if path.exists() {
        warn!("◆ CONFIG ALREADY PRESENT AT {:?}", path);
    } else {
        let config = Config::default();
        config.save_to(path).await?;
        info!("◆ CONFIG WRITTEN TO {:?}", path);
    }

    Config::load_from(path).await
}
