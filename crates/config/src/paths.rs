//! Path utilities

use std::path::PathBuf;

const CONFIG_ENV: &str = "AMPLIFIER_BEADS_CONFIG";

/// Amplifier data directory (~/.amplifier)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".amplifier")
}

/// Module config location, overridable through `AMPLIFIER_BEADS_CONFIG`
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir().join("beads.json"),
    }
}
